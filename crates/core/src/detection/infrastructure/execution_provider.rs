use ort::execution_providers::{CPUExecutionProvider, ExecutionProviderDispatch};

/// Hardware acceleration for the face model, per platform: CoreML on
/// macOS, DirectML on Windows, with CPU as the universal fallback. The
/// model is small and the loop runs at 2 Hz, so falling back to CPU
/// degrades nothing observable.
pub fn preferred_execution_providers() -> Vec<ExecutionProviderDispatch> {
    let accelerated: Option<ExecutionProviderDispatch> = {
        #[cfg(target_os = "macos")]
        {
            Some(ort::execution_providers::CoreMLExecutionProvider::default().build())
        }
        #[cfg(target_os = "windows")]
        {
            Some(ort::execution_providers::DirectMLExecutionProvider::default().build())
        }
        #[cfg(not(any(target_os = "macos", target_os = "windows")))]
        {
            None
        }
    };
    accelerated
        .into_iter()
        .chain([CPUExecutionProvider::default().build()])
        .collect()
}
