// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license
//
// ONNX Runtime 推理后端
// 会话构建、执行后端选择、输入/输出缓冲区管理

use std::time::Instant;

use ndarray::{Array, IxDyn};
use ort::execution_providers::{
    CPUExecutionProvider, CUDAExecutionProvider, CoreMLExecutionProvider,
    DirectMLExecutionProvider, ExecutionProviderDispatch, OpenVINOExecutionProvider,
    TensorRTExecutionProvider,
};
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use ort::value::TensorRef;
use serde::{Deserialize, Serialize};

use crate::{Configuration, Engine, Error, Result};

/// 执行后端 (Execution Provider)
///
/// OpenVINO / DirectML / CoreML 需要开启同名 Cargo feature,
/// 未编译或注册失败时 ONNX Runtime 回退到 CPU。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OrtEP {
    #[default]
    CPU,
    CUDA(u32),
    Trt { device_id: u32, fp16: bool },
    /// OpenVINO (CPU 设备)
    OpenVINO,
    DirectML(u32),
    CoreML,
}

impl OrtEP {
    /// 按优先级排列的执行后端, CPU 总是作为最后的回退
    fn dispatch(&self) -> Vec<ExecutionProviderDispatch> {
        let mut eps = match *self {
            OrtEP::CPU => vec![],
            OrtEP::CUDA(device_id) => vec![CUDAExecutionProvider::default()
                .with_device_id(device_id as i32)
                .build()],
            OrtEP::Trt { device_id, fp16 } => vec![
                TensorRTExecutionProvider::default()
                    .with_device_id(device_id as i32)
                    .with_fp16(fp16)
                    .with_engine_cache(true)
                    .build(),
                CUDAExecutionProvider::default()
                    .with_device_id(device_id as i32)
                    .build(),
            ],
            OrtEP::OpenVINO => vec![OpenVINOExecutionProvider::default()
                .with_device_type("CPU")
                .build()],
            OrtEP::DirectML(device_id) => vec![DirectMLExecutionProvider::default()
                .with_device_id(device_id as i32)
                .build()],
            OrtEP::CoreML => vec![CoreMLExecutionProvider::default().build()],
        };
        eps.push(CPUExecutionProvider::default().build());
        eps
    }
}

/// ONNX Runtime 推理引擎
///
/// 持有一个会话以及固定大小的输入/输出缓冲区。
pub struct OrtBackend {
    session: Session,
    input_name: String,
    output_name: String,
    input: Array<f32, IxDyn>,
    output: Vec<f32>,
    output_len: usize,
}

impl OrtBackend {
    /// 根据配置加载模型并分配缓冲区
    pub fn build(config: &Configuration) -> Result<Self> {
        config.validate()?;

        let path = &config.model_path;
        if !path.exists() {
            return Err(Error::ModelLoad(format!(
                "model file not found: {}",
                path.display()
            )));
        }

        let t = Instant::now();
        let session = Session::builder()
            .map_err(|e| Error::ModelLoad(format!("failed to create session builder: {e}")))?
            .with_execution_providers(config.provider.dispatch())
            .map_err(|e| Error::ModelLoad(format!("failed to register execution provider: {e}")))?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e| Error::ModelLoad(format!("failed to set optimization level: {e}")))?
            .commit_from_file(path)
            .map_err(|e| Error::ModelLoad(format!("{}: {e}", path.display())))?;

        // 名称必须与模型一致
        if !session.inputs.iter().any(|i| i.name == config.input_name) {
            return Err(Error::ConfigurationMismatch(format!(
                "model has no input named '{}'",
                config.input_name
            )));
        }
        if !session.outputs.iter().any(|o| o.name == config.output_name) {
            return Err(Error::ConfigurationMismatch(format!(
                "model has no output named '{}'",
                config.output_name
            )));
        }

        let dims: Vec<usize> = config.input_shape.iter().map(|&d| d as usize).collect();
        let input = Array::zeros(IxDyn(&dims));

        tracing::info!(
            model = %path.display(),
            ep = ?config.provider,
            elapsed = ?t.elapsed(),
            "onnx session ready"
        );

        Ok(Self {
            session,
            input_name: config.input_name.clone(),
            output_name: config.output_name.clone(),
            input,
            output: Vec::with_capacity(config.output_len()),
            output_len: config.output_len(),
        })
    }
}

impl Engine for OrtBackend {
    fn set_input(&mut self, input: &[f32]) -> Result<()> {
        let buf = self
            .input
            .as_slice_mut()
            .ok_or_else(|| Error::EngineExecution("input buffer is not contiguous".to_string()))?;
        if buf.len() != input.len() {
            return Err(Error::mismatch("input buffer length", buf.len(), input.len()));
        }
        buf.copy_from_slice(input);
        Ok(())
    }

    fn run(&mut self) -> Result<()> {
        let t = Instant::now();
        let input = self.input.as_standard_layout();
        let tensor = TensorRef::from_array_view(&input)
            .map_err(|e| Error::EngineExecution(format!("failed to create input tensor: {e}")))?;

        let outputs = self
            .session
            .run(ort::inputs![self.input_name.as_str() => tensor])
            .map_err(|e| Error::EngineExecution(e.to_string()))?;

        let value = outputs.get(self.output_name.as_str()).ok_or_else(|| {
            Error::EngineExecution(format!("output '{}' not found", self.output_name))
        })?;
        let (_, data) = value
            .try_extract_tensor::<f32>()
            .map_err(|e| Error::EngineExecution(format!("failed to extract output: {e}")))?;

        if data.len() != self.output_len {
            return Err(Error::mismatch("output tensor length", self.output_len, data.len()));
        }
        self.output.clear();
        self.output.extend_from_slice(data);

        tracing::debug!(elapsed = ?t.elapsed(), "engine run");
        Ok(())
    }

    fn output(&self) -> &[f32] {
        &self.output
    }
}
