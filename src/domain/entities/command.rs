/// A parsed chat command: `!pay 5 XLM bob` becomes verb `pay`, args `["5", "XLM", "bob"]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    pub verb: String,
    pub args: Vec<String>,
}

impl Command {
    pub fn new(verb: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            verb: verb.into(),
            args,
        }
    }

    pub fn arg(&self, index: usize) -> Option<&str> {
        self.args.get(index).map(String::as_str)
    }

    pub fn matches(&self, verb: &str) -> bool {
        self.verb.eq_ignore_ascii_case(verb)
    }
}
