use crate::utils::error::{BridgeError, Result};
use tokio_serial::{DataBits, FlowControl, Parity, SerialPortBuilderExt, SerialStream, StopBits};

pub const DEFAULT_BAUD_RATE: u32 = 115_200;

/// 以 8N1、無流量控制開啟序列埠
pub fn open_serial(path: &str, baud_rate: u32) -> Result<SerialStream> {
    tracing::debug!("Opening serial device {} at {} baud", path, baud_rate);

    tokio_serial::new(path, baud_rate)
        .data_bits(DataBits::Eight)
        .stop_bits(StopBits::One)
        .parity(Parity::None)
        .flow_control(FlowControl::None)
        .open_native_async()
        .map_err(|e| BridgeError::ConnectionError {
            device: path.to_string(),
            message: e.to_string(),
        })
}
