//! # Controller Mapping Module
//!
//! Vendor classification and human-readable control names.
//!
//! Classification is a case-insensitive substring match against the device
//! name, fixed at connect time. It only drives display-name lookup; the
//! protocol treats every device identically.

/// Vendor family of an attached controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerKind {
    Xbox,
    Ps4,
    Logitech,
    Generic,
}

impl ControllerKind {
    /// Classify a device from its reported name.
    ///
    /// # Examples
    ///
    /// ```
    /// use ds_link::input::mapping::ControllerKind;
    ///
    /// assert_eq!(ControllerKind::from_name("Xbox Wireless Controller"), ControllerKind::Xbox);
    /// assert_eq!(ControllerKind::from_name("Sony DualShock 4"), ControllerKind::Ps4);
    /// ```
    pub fn from_name(name: &str) -> Self {
        let name = name.to_lowercase();
        if name.contains("xbox") || name.contains("xinput") {
            ControllerKind::Xbox
        } else if name.contains("playstation") || name.contains("ps4") || name.contains("dualshock")
        {
            ControllerKind::Ps4
        } else if name.contains("logitech") {
            ControllerKind::Logitech
        } else {
            ControllerKind::Generic
        }
    }
}

/// Display name for a button index on the given controller family.
///
/// Families without a curated table fall back to `Button N`.
pub fn button_name(kind: ControllerKind, index: usize) -> String {
    let name = match kind {
        ControllerKind::Xbox => match index {
            0 => "A",
            1 => "B",
            2 => "X",
            3 => "Y",
            4 => "LB",
            5 => "RB",
            6 => "LT",
            7 => "RT",
            8 => "Back",
            9 => "Start",
            10 => "LS",
            11 => "RS",
            12 => "DPad_Up",
            13 => "DPad_Down",
            14 => "DPad_Left",
            15 => "DPad_Right",
            16 => "Xbox",
            _ => "",
        },
        ControllerKind::Ps4 => match index {
            0 => "X",
            1 => "Circle",
            2 => "Square",
            3 => "Triangle",
            4 => "L1",
            5 => "R1",
            6 => "L2",
            7 => "R2",
            8 => "Share",
            9 => "Options",
            10 => "L3",
            11 => "R3",
            12 => "DPad_Up",
            13 => "DPad_Down",
            14 => "DPad_Left",
            15 => "DPad_Right",
            16 => "PS",
            _ => "",
        },
        ControllerKind::Logitech | ControllerKind::Generic => "",
    };
    if name.is_empty() {
        format!("Button {index}")
    } else {
        name.to_string()
    }
}

/// Display name for an axis index.
pub fn axis_name(index: usize) -> String {
    match index {
        0 => "Left_X".to_string(),
        1 => "Left_Y".to_string(),
        2 => "Right_X".to_string(),
        3 => "Right_Y".to_string(),
        4 => "LT".to_string(),
        5 => "RT".to_string(),
        _ => format!("Axis {index}"),
    }
}
