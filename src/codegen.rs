mod compile;

pub(crate) use compile::Compiler;
