pub mod fraud_classifier;
pub mod fraud_event;
pub mod signal_extractor;
pub mod tick_signal;
