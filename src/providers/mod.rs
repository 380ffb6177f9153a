pub mod gemini;

pub use gemini::GeminiEstimator;
