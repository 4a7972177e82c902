/// Execution target for the ONNX Runtime backend.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum InferenceDevice {
    #[default] CPU,
    CUDA(usize),
}

impl InferenceDevice {
    pub fn to_string(&self) -> String {
        match self {
            InferenceDevice::CPU => "CPU".to_string(),
            InferenceDevice::CUDA(id) => format!("CUDA:{}", id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names() {
        assert_eq!(InferenceDevice::default().to_string(), "CPU");
        assert_eq!(InferenceDevice::CUDA(1).to_string(), "CUDA:1");
    }
}
