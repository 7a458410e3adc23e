/// Gives evaluated code access to the host's output stream.
pub trait Context {
    fn output_stream(&mut self) -> &mut String;
}

/// Standard context capturing output into a caller-provided buffer.
pub struct SimpleContext<'a> {
    output: &'a mut String,
}

impl<'a> SimpleContext<'a> {
    pub fn new(output: &'a mut String) -> Self {
        Self { output }
    }
}

impl Context for SimpleContext<'_> {
    fn output_stream(&mut self) -> &mut String {
        self.output
    }
}
