//! Type-erased views over `bitflags` sets
//!
//! Flag sets are declared with [`bitflags::bitflags!`] over `u64`, then
//! registered with [`flag_sets!`](crate::flag_sets) so slots can hold them.
//! Every set starts with a real member (conventionally `NO_*`) at bit 1, so a
//! bit pattern of zero never names a valid combination.
//!
//! ```ignore
//! bitflags::bitflags! {
//!     #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
//!     pub struct DamageType: u64 {
//!         const NO_DAMAGE_TYPE = 1 << 0;
//!         const BLUNT = 1 << 1;
//!         const SLASHING = 1 << 2;
//!     }
//! }
//! cybergunk_model::flag_sets!(DamageType);
//!
//! let value = Value::from(DamageType::BLUNT | DamageType::SLASHING);
//! ```

use std::any::TypeId;
use std::fmt;
use std::hash::{Hash, Hasher};

use crate::error::ModelError;

/// A `bitflags` type that slots can store.
///
/// Implemented through [`flag_sets!`](crate::flag_sets).
pub trait FlagSet: bitflags::Flags<Bits = u64> + Copy + 'static {
    const KIND: &'static FlagKind;
}

/// Registers `bitflags` types as slot flag sets.
#[macro_export]
macro_rules! flag_sets {
    ($($ty:ident),+ $(,)?) => {
        $(
            impl $crate::flags::FlagSet for $ty {
                const KIND: &'static $crate::flags::FlagKind =
                    &$crate::flags::FlagKind::of::<$ty>(stringify!($ty));
            }
        )+
    };
}

/// The runtime description of one flag set, backed by its `bitflags` table.
pub struct FlagKind {
    name: &'static str,
    type_id: fn() -> TypeId,
    from_name: fn(&str) -> Option<u64>,
    from_bits: fn(u64) -> Option<u64>,
    names: fn(u64) -> Vec<&'static str>,
}

impl FlagKind {
    pub const fn of<F>(name: &'static str) -> Self
    where
        F: bitflags::Flags<Bits = u64> + 'static,
    {
        Self {
            name,
            type_id: TypeId::of::<F>,
            from_name: from_name_of::<F>,
            from_bits: from_bits_of::<F>,
            names: names_of::<F>,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Member names in declaration order.
    pub fn members(&self) -> Vec<&'static str> {
        (self.names)(u64::MAX)
    }

    /// Look up a single member by its exact name.
    pub fn member(&'static self, name: &str) -> Result<Flags, ModelError> {
        (self.from_name)(name)
            .map(|bits| Flags::from_bits_retain(self, bits))
            .ok_or_else(|| ModelError::invalid_flag(self.name, name))
    }

    /// Accept an integer only when it is a non-empty combination of members.
    pub fn normalize(&'static self, value: i64) -> Result<Flags, ModelError> {
        let invalid = || ModelError::invalid_flag(self.name, value.to_string());
        let bits = u64::try_from(value).map_err(|_| invalid())?;
        match (self.from_bits)(bits) {
            Some(bits) if bits != 0 => Ok(Flags::from_bits_retain(self, bits)),
            _ => Err(invalid()),
        }
    }
}

fn from_name_of<F: bitflags::Flags<Bits = u64>>(name: &str) -> Option<u64> {
    F::from_name(name).map(|flags| flags.bits())
}

fn from_bits_of<F: bitflags::Flags<Bits = u64>>(bits: u64) -> Option<u64> {
    F::from_bits(bits).map(|flags| flags.bits())
}

fn names_of<F: bitflags::Flags<Bits = u64>>(bits: u64) -> Vec<&'static str> {
    F::from_bits_truncate(bits)
        .iter_names()
        .map(|(name, _)| name)
        .collect()
}

/// Two kinds are the same kind only when they wrap the same Rust type.
impl PartialEq for FlagKind {
    fn eq(&self, other: &Self) -> bool {
        (self.type_id)() == (other.type_id)()
    }
}

impl Eq for FlagKind {}

impl fmt::Debug for FlagKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FlagKind({})", self.name)
    }
}

impl fmt::Display for FlagKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// A combination of members of one flag set, with its type erased.
#[derive(Clone, Copy)]
pub struct Flags {
    kind: &'static FlagKind,
    bits: u64,
}

impl Flags {
    /// Build from raw bits without checking them against the member set.
    pub const fn from_bits_retain(kind: &'static FlagKind, bits: u64) -> Self {
        Self { kind, bits }
    }

    pub fn kind(&self) -> &'static FlagKind {
        self.kind
    }

    pub fn bits(&self) -> u64 {
        self.bits
    }

    /// Recover the typed set, if these flags belong to `F`.
    pub fn typed<F: FlagSet>(&self) -> Option<F> {
        (self.kind == F::KIND)
            .then(|| F::from_bits(self.bits))
            .flatten()
    }

    /// The single-member flags this combination is made of.
    pub fn split(&self) -> Vec<Flags> {
        self.names()
            .into_iter()
            .filter_map(|name| self.kind.member(name).ok())
            .collect()
    }

    /// Member names present in this combination.
    pub fn names(&self) -> Vec<&'static str> {
        (self.kind.names)(self.bits)
    }
}

impl<F: FlagSet> From<F> for Flags {
    fn from(flags: F) -> Self {
        Flags::from_bits_retain(F::KIND, flags.bits())
    }
}

impl PartialEq for Flags {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind && self.bits == other.bits
    }
}

impl Eq for Flags {}

impl Hash for Flags {
    fn hash<H: Hasher>(&self, state: &mut H) {
        (self.kind.type_id)().hash(state);
        self.bits.hash(state);
    }
}

impl fmt::Debug for Flags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.kind.name, self.names().join("|"))
    }
}

/// Title-cased member names: `MAIN_HAND|OFF_HAND` displays as `Main Hand|Off Hand`.
impl fmt::Display for Flags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<String> = self.names().into_iter().map(title_case).collect();
        write!(f, "{}", names.join("|"))
    }
}

fn title_case(member: &str) -> String {
    member
        .split('_')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => {
                    first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase()
                }
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::{Value, ValueKind};

    bitflags::bitflags! {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub struct Slot: u64 {
            const NO_SLOT = 1 << 0;
            const HEAD = 1 << 1;
            const MAIN_HAND = 1 << 2;
            const OFF_HAND = 1 << 3;
        }
    }

    mod other {
        bitflags::bitflags! {
            #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
            pub struct Slot: u64 {
                const NO_SLOT = 1 << 0;
                const HEAD = 1 << 1;
            }
        }

        crate::flag_sets!(Slot);
    }

    crate::flag_sets!(Slot);

    #[test]
    fn erased_flags_keep_their_bits() {
        let hands = Flags::from(Slot::MAIN_HAND | Slot::OFF_HAND);
        assert_eq!(hands.bits(), 12);
        assert_eq!(hands.kind(), Slot::KIND);
        assert_eq!(hands.typed::<Slot>(), Some(Slot::MAIN_HAND | Slot::OFF_HAND));
        assert_eq!(
            hands.split(),
            vec![Flags::from(Slot::MAIN_HAND), Flags::from(Slot::OFF_HAND)]
        );
    }

    #[test]
    fn normalize_accepts_member_combinations() {
        let flags = Slot::KIND.normalize(12).unwrap();
        assert_eq!(flags, Flags::from(Slot::MAIN_HAND | Slot::OFF_HAND));
    }

    #[test]
    fn normalize_rejects_zero_and_stray_bits() {
        assert!(matches!(
            Slot::KIND.normalize(0),
            Err(ModelError::InvalidFlag { .. })
        ));
        assert!(Slot::KIND.normalize(16 | 2).is_err());
        assert!(Slot::KIND.normalize(-4).is_err());
    }

    #[test]
    fn member_lookup_by_name() {
        assert_eq!(Slot::KIND.member("HEAD").unwrap(), Flags::from(Slot::HEAD));
        let err = Slot::KIND.member("TAIL").unwrap_err();
        assert_eq!(err.to_string(), "Invalid Slot flag value: TAIL");
        assert_eq!(Slot::KIND.members(), ["NO_SLOT", "HEAD", "MAIN_HAND", "OFF_HAND"]);
    }

    #[test]
    fn same_named_sets_are_distinct_kinds() {
        assert_eq!(Slot::KIND.name(), other::Slot::KIND.name());
        assert_ne!(Slot::KIND, other::Slot::KIND);
        let head = Flags::from(other::Slot::HEAD);
        assert_ne!(head, Flags::from(Slot::HEAD));
        assert_eq!(head.typed::<Slot>(), None);
        assert!(!ValueKind::Flags(Slot::KIND).matches(&Value::from(other::Slot::HEAD)));
        assert!(ValueKind::Flags(Slot::KIND).matches(&Value::from(Slot::HEAD)));
    }

    #[test]
    fn display_is_title_cased() {
        assert_eq!(Flags::from(Slot::MAIN_HAND).to_string(), "Main Hand");
        assert_eq!(
            Flags::from(Slot::MAIN_HAND | Slot::OFF_HAND).to_string(),
            "Main Hand|Off Hand"
        );
    }
}
