use std::fmt;

use serialport::{SerialPortInfo, SerialPortType};

use crate::error::{Result, TransportError};

/// What kind of device backs a serial port.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PortKind {
    Usb {
        vid: u16,
        pid: u16,
        serial_number: Option<String>,
        manufacturer: Option<String>,
        product: Option<String>,
    },
    Pci,
    Bluetooth,
    Unknown,
}

/// A serial port found on this machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortInfo {
    pub name: String,
    pub kind: PortKind,
}

impl PortInfo {
    /// Short human description of the backing device.
    pub fn description(&self) -> String {
        match &self.kind {
            PortKind::Usb {
                vid,
                pid,
                manufacturer,
                product,
                ..
            } => {
                let label = match (manufacturer, product) {
                    (Some(m), Some(p)) => format!("{m} {p}"),
                    (None, Some(p)) => p.clone(),
                    (Some(m), None) => m.clone(),
                    (None, None) => "USB device".to_string(),
                };
                format!("{label} [{vid:04x}:{pid:04x}]")
            }
            PortKind::Pci => "PCI device".to_string(),
            PortKind::Bluetooth => "Bluetooth device".to_string(),
            PortKind::Unknown => "n/a".to_string(),
        }
    }
}

impl fmt::Display for PortInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.name, self.description())
    }
}

impl From<SerialPortInfo> for PortInfo {
    fn from(info: SerialPortInfo) -> Self {
        let kind = match info.port_type {
            SerialPortType::UsbPort(usb) => PortKind::Usb {
                vid: usb.vid,
                pid: usb.pid,
                serial_number: usb.serial_number,
                manufacturer: usb.manufacturer,
                product: usb.product,
            },
            SerialPortType::PciPort => PortKind::Pci,
            SerialPortType::BluetoothPort => PortKind::Bluetooth,
            SerialPortType::Unknown => PortKind::Unknown,
        };
        Self {
            name: info.port_name,
            kind,
        }
    }
}

/// Enumerate the serial ports available on this machine.
pub fn list_ports() -> Result<Vec<PortInfo>> {
    let mut ports: Vec<PortInfo> = serialport::available_ports()
        .map_err(TransportError::Enumerate)?
        .into_iter()
        .map(PortInfo::from)
        .collect();
    ports.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(ports)
}
