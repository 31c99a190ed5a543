//! Pickup and delivery scheduling options.
//!
//! Each option has a wire value (what the backend stores) and a label shown
//! in the checkout form.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Error returned when a form value is not a known option.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown {kind}: {value}")]
pub struct UnknownOption {
    pub kind: &'static str,
    pub value: String,
}

macro_rules! wire_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $kind:literal {
            $($variant:ident => $wire:literal, $label:literal;)+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $wire)]
                $variant,
            )+
        }

        impl $name {
            /// Every option in display order.
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            /// Value stored by the backend.
            #[must_use]
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $wire,)+
                }
            }

            /// Human-readable label for forms and order summaries.
            #[must_use]
            pub const fn label(self) -> &'static str {
                match self {
                    $(Self::$variant => $label,)+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = UnknownOption;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($wire => Ok(Self::$variant),)+
                    _ => Err(UnknownOption {
                        kind: $kind,
                        value: s.to_owned(),
                    }),
                }
            }
        }
    };
}

wire_enum! {
    /// A two-hour collection or delivery window.
    TimeSlot, "time slot" {
        EightToTen => "08:00-10:00", "8:00 AM - 10:00 AM";
        TenToNoon => "10:00-12:00", "10:00 AM - 12:00 PM";
        NoonToTwo => "12:00-14:00", "12:00 PM - 2:00 PM";
        TwoToFour => "14:00-16:00", "2:00 PM - 4:00 PM";
        FourToSix => "16:00-18:00", "4:00 PM - 6:00 PM";
        SixToEight => "18:00-20:00", "6:00 PM - 8:00 PM";
    }
}

wire_enum! {
    /// How the driver collects the laundry.
    PickupInstruction, "pickup instruction" {
        InPerson => "in-person", "Driver collects from you (in person)";
        Doorstep => "doorstep", "Leave outside (doorstep/mailbox)";
        Reception => "reception", "Leave at reception/porter";
    }
}

wire_enum! {
    /// How the driver hands the laundry back.
    DeliveryInstruction, "delivery instruction" {
        RingWait => "ring-wait", "Ring bell and wait";
        RingLeave => "ring-leave", "Ring bell and leave";
        Reception => "reception", "Leave at reception/porter";
    }
}

/// Label for a wire value, falling back to the raw value for unknown slots.
#[must_use]
pub fn slot_label(wire: &str) -> &str {
    wire.parse::<TimeSlot>().map_or(wire, |slot| slot.label())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_six_slots_in_order() {
        let wires: Vec<_> = TimeSlot::ALL.iter().map(|s| s.as_str()).collect();
        assert_eq!(
            wires,
            [
                "08:00-10:00",
                "10:00-12:00",
                "12:00-14:00",
                "14:00-16:00",
                "16:00-18:00",
                "18:00-20:00"
            ]
        );
    }

    #[test]
    fn test_from_str_round_trips_wire_value() {
        assert_eq!(
            "ring-leave".parse::<DeliveryInstruction>().unwrap(),
            DeliveryInstruction::RingLeave
        );
        let err = "teleport".parse::<PickupInstruction>().unwrap_err();
        assert_eq!(err.kind, "pickup instruction");
    }

    #[test]
    fn test_serde_uses_wire_value() {
        let json = serde_json::to_string(&TimeSlot::TwoToFour).unwrap();
        assert_eq!(json, "\"14:00-16:00\"");
    }

    #[test]
    fn test_slot_label_falls_back() {
        assert_eq!(slot_label("10:00-12:00"), "10:00 AM - 12:00 PM");
        assert_eq!(slot_label("whenever"), "whenever");
    }
}
