pub mod completion;
pub mod openai;
pub mod persona;
pub mod relay;
