// Key code tables
//
// Stored key ids are DirectInput keyboard scan codes (DIK_*), which is what the
// game reads out of its config file. Native codes are the raylib/GLFW key
// values delivered while the settings window has focus.

/// Stored id meaning "ignore this key press, keep the old binding"
pub const DIK_IGNORE: u8 = 0x00;

/// Label shown for stored ids not present in the table
pub const UNKNOWN_KEY_LABEL: &str = "?";

/// Logical game actions that can be bound to a key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Up,
    Down,
    Left,
    Right,
    ButtonA,
    ButtonB,
    ButtonX,
    ButtonY,
    Start,
}

impl Action {
    /// Every action, in the order the bindings are stored on disk
    pub const ALL: [Action; 9] = [
        Action::Up,
        Action::Down,
        Action::Left,
        Action::Right,
        Action::ButtonA,
        Action::ButtonB,
        Action::ButtonX,
        Action::ButtonY,
        Action::Start,
    ];

    /// Position of the action in [Action::ALL] (and in the stored record)
    pub fn index(self) -> usize {
        self as usize
    }
}

/// Default binding for every action, indexed like [Action::ALL]
pub const DEFAULT_BINDINGS: [u8; 9] = [
    0xC8, // Up    -> DIK_UP
    0xD0, // Down  -> DIK_DOWN
    0xCB, // Left  -> DIK_LEFT
    0xCD, // Right -> DIK_RIGHT
    0x2C, // A     -> DIK_Z
    0x2D, // B     -> DIK_X
    0x1E, // X     -> DIK_A
    0x1F, // Y     -> DIK_S
    0x1C, // Start -> DIK_RETURN
];

/// One row of the translation table
struct KeyEntry {
    /// raylib/GLFW key value
    native: u32,
    /// DirectInput scan code
    dik: u8,
    /// Caption used on the binding buttons
    name: &'static str,
}

const fn key(native: u32, dik: u8, name: &'static str) -> KeyEntry {
    KeyEntry { native, dik, name }
}

// Only keys with both a GLFW value and a DIK code are listed, anything else is
// rejected when remapping.
const KEY_TABLE: &[KeyEntry] = &[
    // Letters
    key(65, 0x1E, "A"),
    key(66, 0x30, "B"),
    key(67, 0x2E, "C"),
    key(68, 0x20, "D"),
    key(69, 0x12, "E"),
    key(70, 0x21, "F"),
    key(71, 0x22, "G"),
    key(72, 0x23, "H"),
    key(73, 0x17, "I"),
    key(74, 0x24, "J"),
    key(75, 0x25, "K"),
    key(76, 0x26, "L"),
    key(77, 0x32, "M"),
    key(78, 0x31, "N"),
    key(79, 0x18, "O"),
    key(80, 0x19, "P"),
    key(81, 0x10, "Q"),
    key(82, 0x13, "R"),
    key(83, 0x1F, "S"),
    key(84, 0x14, "T"),
    key(85, 0x16, "U"),
    key(86, 0x2F, "V"),
    key(87, 0x11, "W"),
    key(88, 0x2D, "X"),
    key(89, 0x15, "Y"),
    key(90, 0x2C, "Z"),
    // Digit row
    key(48, 0x0B, "0"),
    key(49, 0x02, "1"),
    key(50, 0x03, "2"),
    key(51, 0x04, "3"),
    key(52, 0x05, "4"),
    key(53, 0x06, "5"),
    key(54, 0x07, "6"),
    key(55, 0x08, "7"),
    key(56, 0x09, "8"),
    key(57, 0x0A, "9"),
    // Punctuation
    key(32, 0x39, "Space"),
    key(39, 0x28, "'"),
    key(44, 0x33, ","),
    key(45, 0x0C, "-"),
    key(46, 0x34, "."),
    key(47, 0x35, "/"),
    key(59, 0x27, ";"),
    key(61, 0x0D, "="),
    key(91, 0x1A, "["),
    key(92, 0x2B, "\\"),
    key(93, 0x1B, "]"),
    key(96, 0x29, "`"),
    // Editing and navigation
    key(257, 0x1C, "Return"),
    key(258, 0x0F, "Tab"),
    key(259, 0x0E, "Backspace"),
    key(260, 0xD2, "Insert"),
    key(261, 0xD3, "Delete"),
    key(262, 0xCD, "Right"),
    key(263, 0xCB, "Left"),
    key(264, 0xD0, "Down"),
    key(265, 0xC8, "Up"),
    key(266, 0xC9, "Page Up"),
    key(267, 0xD1, "Page Down"),
    key(268, 0xC7, "Home"),
    key(269, 0xCF, "End"),
    // Function keys
    key(290, 0x3B, "F1"),
    key(291, 0x3C, "F2"),
    key(292, 0x3D, "F3"),
    key(293, 0x3E, "F4"),
    key(294, 0x3F, "F5"),
    key(295, 0x40, "F6"),
    key(296, 0x41, "F7"),
    key(297, 0x42, "F8"),
    key(298, 0x43, "F9"),
    key(299, 0x44, "F10"),
    key(300, 0x57, "F11"),
    key(301, 0x58, "F12"),
    // Keypad
    key(320, 0x52, "Num 0"),
    key(321, 0x4F, "Num 1"),
    key(322, 0x50, "Num 2"),
    key(323, 0x51, "Num 3"),
    key(324, 0x4B, "Num 4"),
    key(325, 0x4C, "Num 5"),
    key(326, 0x4D, "Num 6"),
    key(327, 0x47, "Num 7"),
    key(328, 0x48, "Num 8"),
    key(329, 0x49, "Num 9"),
    key(330, 0x53, "Num ."),
    key(331, 0xB5, "Num /"),
    key(332, 0x37, "Num *"),
    key(333, 0x4A, "Num -"),
    key(334, 0x4E, "Num +"),
    key(335, 0x9C, "Num Enter"),
    // Modifiers
    key(340, 0x2A, "L-Shift"),
    key(341, 0x1D, "L-Ctrl"),
    key(342, 0x38, "L-Alt"),
    key(344, 0x36, "R-Shift"),
    key(345, 0x9D, "R-Ctrl"),
    key(346, 0xB8, "R-Alt"),
];

/// Translate a native key code into the stored key id
///
/// Returns [DIK_IGNORE] for keys the game can't bind (escape, lock keys,
/// media keys, ...).
pub fn dx_key(native: u32) -> u8 {
    KEY_TABLE
        .iter()
        .find(|entry| entry.native == native)
        .map_or(DIK_IGNORE, |entry| entry.dik)
}

/// Caption for a stored key id, [UNKNOWN_KEY_LABEL] if it isn't in the table
pub fn dx_name(dik: u8) -> &'static str {
    if dik == DIK_IGNORE {
        return UNKNOWN_KEY_LABEL;
    }
    KEY_TABLE
        .iter()
        .find(|entry| entry.dik == dik)
        .map_or(UNKNOWN_KEY_LABEL, |entry| entry.name)
}

/// Whether a stored key id is one the table knows about
pub fn is_known_dx(dik: u8) -> bool {
    dik != DIK_IGNORE && KEY_TABLE.iter().any(|entry| entry.dik == dik)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arrow_keys_translate_to_dik_codes() {
        assert_eq!(dx_key(265), 0xC8);
        assert_eq!(dx_key(264), 0xD0);
        assert_eq!(dx_key(263), 0xCB);
        assert_eq!(dx_key(262), 0xCD);
    }

    #[test]
    fn unsupported_native_codes_are_ignored() {
        // escape, caps lock, left super, and values outside any keyboard range
        for native in [0, 1, 256, 280, 343, 348, 9999, u32::MAX] {
            assert_eq!(dx_key(native), DIK_IGNORE, "native {native}");
        }
    }

    #[test]
    fn names_resolve_and_unknown_falls_back() {
        assert_eq!(dx_name(0x1C), "Return");
        assert_eq!(dx_name(0x2C), "Z");
        assert_eq!(dx_name(DIK_IGNORE), UNKNOWN_KEY_LABEL);
        assert_eq!(dx_name(0xFF), UNKNOWN_KEY_LABEL);
    }

    #[test]
    fn table_has_no_duplicate_codes() {
        for (i, a) in KEY_TABLE.iter().enumerate() {
            for b in &KEY_TABLE[i + 1..] {
                assert_ne!(a.native, b.native, "native {} listed twice", a.native);
                assert_ne!(a.dik, b.dik, "dik {:#x} listed twice", a.dik);
            }
        }
    }

    #[test]
    fn defaults_are_all_bindable() {
        for dik in DEFAULT_BINDINGS {
            assert!(is_known_dx(dik), "default {dik:#x} not in table");
        }
    }

    #[test]
    fn action_order_matches_index() {
        for (i, action) in Action::ALL.iter().enumerate() {
            assert_eq!(action.index(), i);
        }
    }
}
