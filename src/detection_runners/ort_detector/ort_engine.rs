//! File/code adapted from https://github.com/jamjamjon/usls
//!
//! ONNX Runtime backend, built with the `ort` feature.

use anyhow::Result;
use ort::{
    execution_providers::{CPUExecutionProvider, CUDAExecutionProvider, ExecutionProvider},
    session::builder::{GraphOptimizationLevel, SessionBuilder},
    session::Session,
    value::Value,
};
use crate::common::InferenceDevice;
use crate::data::parse_names_metadata;
use crate::detection_runners::inference_process::InferenceBackend;
use crate::detection_runners::input_wrapper::InputTensor;
use crate::error::DetectError;

pub(crate) const CROSS_MARK: &str = "❌";

#[derive(Debug, Clone, Default)]
pub struct ConfigOrt {
    pub onnx_path: String,
    /// Path of the onnxruntime shared library loaded at runtime.
    pub ort_lib_path: String,
    pub device: InferenceDevice,
}

impl ConfigOrt {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn with_model(mut self, onnx_path: &str) -> Self {
        self.onnx_path = onnx_path.to_string();
        self
    }

    pub fn with_ort_lib_path(mut self, ort_lib_path: &str) -> Self {
        self.ort_lib_path = ort_lib_path.to_string();
        self
    }

    pub fn with_device(mut self, device: InferenceDevice) -> Self {
        self.device = device;
        self
    }
}

#[derive(Debug)]
pub struct OrtEngine {
    session: Session,
    device: InferenceDevice,
    input_name: String,
    output_name: String,
}

impl OrtEngine {
    pub fn new(config: &ConfigOrt) -> Result<Self> {
        match ort::init_from(&config.ort_lib_path).commit() {
            Ok(_) => {},
            Err(e) => anyhow::bail!("{CROSS_MARK} Failed to commit ORT from '{}': {:?}", config.ort_lib_path, e),
        };

        let mut builder = Session::builder()?;

        let mut device = config.device;
        match device {
            InferenceDevice::CUDA(device_id) => {
                Self::build_cuda(&mut builder, device_id).unwrap_or_else(|err| {
                    log::warn!("{err}, Using cpu");
                    device = InferenceDevice::CPU;
                })
            }
            InferenceDevice::CPU => {
                Self::build_cpu(&mut builder)?;
            }
        }

        let session = builder
            .with_optimization_level(GraphOptimizationLevel::Level3)?
            .commit_from_file(&config.onnx_path)?;

        let input_name = session
            .inputs
            .first()
            .map(|i| i.name.clone())
            .ok_or_else(|| anyhow::anyhow!("{CROSS_MARK} Model '{}' has no inputs", config.onnx_path))?;
        let output_name = session
            .outputs
            .first()
            .map(|o| o.name.clone())
            .ok_or_else(|| anyhow::anyhow!("{CROSS_MARK} Model '{}' has no outputs", config.onnx_path))?;

        log::info!("Backend: ONNXRuntime | Device: {} | Input: {} | Output: {}",
            device.to_string(), input_name, output_name);

        Ok(Self {
            session,
            device,
            input_name,
            output_name,
        })
    }

    fn build_cuda(builder: &mut SessionBuilder, device_id: usize) -> Result<()> {
        let ep = CUDAExecutionProvider::default().with_device_id(device_id as i32);
        if ep.is_available()? {
            match ep.register(builder) {
                Ok(_) => { }
                Err(err) => { anyhow::bail!("{CROSS_MARK} CUDA initialization failed: {:?}", err) }
            }
            Ok(())
        } else {
            anyhow::bail!("{CROSS_MARK} CUDA execution provider not available")
        }
    }

    fn build_cpu(builder: &mut SessionBuilder) -> Result<()> {
        let ep = CPUExecutionProvider::default();
        match ep.register(builder) {
            Ok(_) => Ok(()),
            Err(err) => anyhow::bail!("{CROSS_MARK} CPU initialization failed: {:?}", err),
        }
    }

    pub fn device(&self) -> &InferenceDevice {
        &self.device
    }

    pub fn try_fetch(&self, key: &str) -> Option<String> {
        match self.session.metadata() {
            Err(_) => None,
            Ok(metadata) => metadata.custom(key).unwrap_or_default(),
        }
    }

    /// Class names exported into the model metadata by Ultralytics.
    pub fn class_names(&self) -> Option<Vec<String>> {
        self.try_fetch("names").map(|names| parse_names_metadata(&names))
    }

    fn run(&mut self, x: &InputTensor) -> Result<Vec<f32>> {
        let value = Value::from_array(x.0.clone())?;
        let outputs = self.session.run(ort::inputs![self.input_name.as_str() => value]?)?;
        let y = outputs[self.output_name.as_str()].try_extract_tensor::<f32>()?;
        Ok(y.iter().copied().collect())
    }
}

impl InferenceBackend for OrtEngine {
    fn name(&self) -> &'static str {
        "onnxruntime"
    }

    fn infer(&mut self, x: &InputTensor) -> crate::error::Result<Vec<f32>> {
        if !matches!(x.shape(), [1, 3, h, w] if h == w) {
            return Err(DetectError::InferenceUnavailable(format!("unexpected input shape {:?}", x.shape())));
        }
        self.run(x).map_err(|err| DetectError::InferenceUnavailable(err.to_string()))
    }

    fn warm_up(&mut self, input_size: u32) -> crate::error::Result<()> {
        let s = input_size as usize;
        let x = InputTensor::from_planar(s, vec![0.; 3 * s * s])?;
        self.infer(&x).map(|_| ())
    }
}
