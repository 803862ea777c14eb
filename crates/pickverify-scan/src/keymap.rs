//! Keystroke input and virtual-key translation.
//!
//! Keyboard-wedge scanners deliver a label as a sequence of key-down events.
//! The station only needs to recognize two keys itself, Escape and the
//! terminator; everything else is translated to an unshifted character.
//! Keys without a character (Shift, Ctrl, function keys) translate to NUL,
//! which is how a shifted `;` reaches the extractor as NUL followed by `;`.

use pickverify_core::constants::{NUL, TERMINATOR};
use serde::{Deserialize, Serialize};

/// Virtual-key code of the Escape key.
pub const VK_ESCAPE: u16 = 0x1B;

/// Virtual-key code of the Return key.
pub const VK_RETURN: u16 = 0x0D;

/// Virtual-key code of the Shift key.
pub const VK_SHIFT: u16 = 0x10;

/// One key-down event from the keystroke collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum KeyEvent {
    /// The dedicated Escape key: resets the workflow.
    Escape,

    /// A platform virtual-key code, translated with [`translate_virtual_key`].
    VirtualKey(u16),

    /// A character already translated by the input surface.
    Char(char),
}

impl KeyEvent {
    /// Build a key event from a virtual-key code, recognizing Escape.
    ///
    /// # Examples
    ///
    /// ```
    /// use pickverify_scan::KeyEvent;
    ///
    /// assert_eq!(KeyEvent::from_virtual_key(0x1B), KeyEvent::Escape);
    /// assert_eq!(KeyEvent::from_virtual_key(0x41), KeyEvent::VirtualKey(0x41));
    /// ```
    pub fn from_virtual_key(vk: u16) -> Self {
        if vk == VK_ESCAPE {
            Self::Escape
        } else {
            Self::VirtualKey(vk)
        }
    }

    /// Returns `true` for the Escape key.
    pub fn is_escape(&self) -> bool {
        matches!(self, Self::Escape)
    }

    /// Character this event contributes to the scan buffer.
    ///
    /// Returns `None` for Escape, which never reaches the buffer.
    pub fn to_char(self) -> Option<char> {
        match self {
            Self::Escape => None,
            Self::VirtualKey(vk) => Some(translate_virtual_key(vk)),
            Self::Char(ch) => Some(ch),
        }
    }
}

/// Translate a virtual-key code to its unshifted character.
///
/// Letters translate to uppercase, matching what an unshifted key-to-char
/// mapping reports. Unmapped keys translate to NUL.
///
/// # Examples
///
/// ```
/// use pickverify_scan::translate_virtual_key;
///
/// assert_eq!(translate_virtual_key(0x35), '5');
/// assert_eq!(translate_virtual_key(0x51), 'Q');
/// assert_eq!(translate_virtual_key(0x0D), '\r');
/// assert_eq!(translate_virtual_key(0xBA), ';');
/// assert_eq!(translate_virtual_key(0x10), '\0'); // Shift
/// ```
pub fn translate_virtual_key(vk: u16) -> char {
    match vk {
        0x08 => '\u{8}',
        0x09 => '\t',
        VK_RETURN => TERMINATOR,
        VK_ESCAPE => '\u{1b}',
        0x20 => ' ',
        0x30..=0x39 | 0x41..=0x5A => char::from(vk as u8),
        // Numpad operators
        0x6A => '*',
        0x6B => '+',
        0x6D => '-',
        0x6E => '.',
        0x6F => '/',
        // OEM punctuation (US layout)
        0xBA => ';',
        0xBB => '=',
        0xBC => ',',
        0xBD => '-',
        0xBE => '.',
        0xBF => '/',
        0xC0 => '`',
        0xDB => '[',
        0xDC => '\\',
        0xDD => ']',
        0xDE => '\'',
        _ => NUL,
    }
}
