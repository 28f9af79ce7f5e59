use bitflags::bitflags;
use serde::Deserialize;
use serde::Serialize;

bitflags! {
    /// Declared modifiers of a type.
    ///
    /// Bit values follow the JVM reflection constants so masks written for
    /// that platform can be reused verbatim.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct Modifiers: u32 {
        const PUBLIC = 0x0001;
        const PRIVATE = 0x0002;
        const PROTECTED = 0x0004;
        const STATIC = 0x0008;
        const FINAL = 0x0010;
        const SYNCHRONIZED = 0x0020;
        const VOLATILE = 0x0040;
        const TRANSIENT = 0x0080;
        const NATIVE = 0x0100;
        const INTERFACE = 0x0200;
        const ABSTRACT = 0x0400;
        const STRICT = 0x0800;
    }
}

impl Modifiers {
    /// True when at least one bit of `mask` is set.
    pub fn any_of(self, mask: Modifiers) -> bool {
        self.intersects(mask)
    }

    /// True when no bit of `mask` is set.
    pub fn none_of(self, mask: Modifiers) -> bool {
        !self.intersects(mask)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn matches_any_bit_of_mask() {
        let mods = Modifiers::PUBLIC | Modifiers::STATIC;
        assert!(mods.any_of(Modifiers::STATIC | Modifiers::FINAL));
        assert!(!mods.any_of(Modifiers::FINAL | Modifiers::ABSTRACT));
        assert!(mods.none_of(Modifiers::PRIVATE));
    }

    #[test]
    fn deserializes_from_flag_names() {
        let mods: Modifiers = serde_json::from_str("\"PUBLIC | ABSTRACT\"").unwrap();
        assert_eq!(mods, Modifiers::PUBLIC | Modifiers::ABSTRACT);
        assert_eq!(mods.bits(), 0x0401);
    }
}
