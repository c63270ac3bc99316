// Resume analysis: prompt assembly, the model call and cleanup of its output.
// The model is reached only through `llm_client::TextGenerator`.

pub mod cleaner;
pub mod handlers;
pub mod prompts;
