use std::fmt::{Debug, Formatter};

macro_rules! flag_set {
    (
        $(#[$meta:meta])*
        $name:ident {
            $($(#[$flag_meta:meta])* $flag:ident = $bit:expr,)*
        }
    ) => {
        $(#[$meta])*
        #[derive(Copy, Clone, Eq, PartialEq, Default)]
        pub struct $name(u8);

        impl $name {
            $($(#[$flag_meta])* pub const $flag: Self = Self($bit);)*

            pub const fn empty() -> Self {
                Self(0)
            }

            /// Raw bits, ready to be OR-ed into a command.
            pub const fn bits(self) -> u8 {
                self.0
            }

            pub const fn contains(self, other: Self) -> bool {
                self.0 & other.0 == other.0
            }

            pub fn set(&mut self, other: Self) {
                self.0 |= other.0;
            }

            pub fn clear(&mut self, other: Self) {
                self.0 &= !other.0;
            }

            pub fn assign(&mut self, other: Self, value: bool) {
                if value {
                    self.set(other);
                } else {
                    self.clear(other);
                }
            }

            /// Copy of `self` with `other` assigned to `value`, leaving `self` untouched.
            pub fn with(mut self, other: Self, value: bool) -> Self {
                self.assign(other, value);
                self
            }
        }

        impl std::ops::BitOr for $name {
            type Output = Self;

            fn bitor(self, rhs: Self) -> Self {
                Self(self.0 | rhs.0)
            }
        }

        impl Debug for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                let mut set = f.debug_set();
                $(if self.contains(Self::$flag) {
                    set.entry(&stringify!($flag));
                })*
                set.finish()
            }
        }
    };
}

flag_set! {
    /// Function set flags. Fixed once the controller is initialized.
    FunctionFlags {
        /// 8-bit interface. Never set through the I2C backpack.
        EIGHT_BIT_MODE = 0b00010000,
        TWO_LINES = 0b00001000,
        FONT_5X10 = 0b00000100,
    }
}

flag_set! {
    /// Display on/off control flags.
    ControlFlags {
        DISPLAY_ON = 0b00000100,
        CURSOR_ON = 0b00000010,
        BLINK_ON = 0b00000001,
    }
}

flag_set! {
    /// Entry mode flags.
    EntryModeFlags {
        /// Cursor moves right after each character, so text reads left to right.
        LEFT_TO_RIGHT = 0b00000010,
        /// Display shifts with every character, keeping the cursor in place.
        AUTOSCROLL = 0b00000001,
    }
}

flag_set! {
    /// Cursor/display shift flags. Transient, never cached.
    ShiftFlags {
        DISPLAY_MOVE = 0b00001000,
        MOVE_RIGHT = 0b00000100,
    }
}

/// Backlight state. Rides along on every byte written to the expander.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
pub enum Backlight {
    #[default]
    Off,
    On,
}

impl Backlight {
    /// The expander bit for this state.
    pub const fn bits(self) -> u8 {
        match self {
            Backlight::Off => 0,
            Backlight::On => super::pin::BACKLIGHT,
        }
    }
}

impl From<bool> for Backlight {
    fn from(on: bool) -> Self {
        if on { Backlight::On } else { Backlight::Off }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assign_touches_only_the_given_flag() {
        let mut control = ControlFlags::DISPLAY_ON | ControlFlags::BLINK_ON;
        control.assign(ControlFlags::BLINK_ON, false);
        control.assign(ControlFlags::CURSOR_ON, true);
        assert_eq!(control.bits(), 0b110);
        assert!(!control.contains(ControlFlags::BLINK_ON));
    }

    #[test]
    fn debug_lists_set_flags() {
        let entry = EntryModeFlags::LEFT_TO_RIGHT;
        assert_eq!(format!("{:?}", entry), "{\"LEFT_TO_RIGHT\"}");
        assert_eq!(format!("{:?}", FunctionFlags::empty()), "{}");
    }
}
