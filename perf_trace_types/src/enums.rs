// Wire-level enums shared by the decode and file-reading layers.

#![allow(non_upper_case_globals)]

use core::fmt;

/// Low 5 bits select the base field encoding; high 3 bits are flags
/// (`CArrayFlag`, `VArrayFlag`, `ChainFlag`).
#[repr(transparent)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct FieldEncoding(pub u8);

impl FieldEncoding {
    pub const ValueMask: u8 = 0x1F;

    /// Field is a constant-size array; a count follows the encoding/format bytes.
    pub const CArrayFlag: u8 = 0x20;
    /// Field is a variable-size array; a u16 element count precedes the data.
    pub const VArrayFlag: u8 = 0x40;
    /// A `format` byte follows this encoding byte (on `format`, a `tag` follows).
    pub const ChainFlag: u8 = 0x80;

    /// `CArrayFlag | VArrayFlag`.
    pub const ArrayFlagMask: u8 = Self::CArrayFlag | Self::VArrayFlag;
    /// `CArrayFlag | VArrayFlag | ChainFlag`.
    pub const FlagMask: u8 = Self::ArrayFlagMask | Self::ChainFlag;

    pub const Invalid: Self = Self(0);
    pub const Value8: Self = Self(1);
    pub const Value16: Self = Self(2);
    pub const Value32: Self = Self(3);
    pub const Value64: Self = Self(4);
    pub const Value128: Self = Self(5);
    pub const ZStringChar8: Self = Self(6);
    pub const ZStringChar16: Self = Self(7);
    pub const ZStringChar32: Self = Self(8);
    pub const StringLength16Char8: Self = Self(9);
    pub const StringLength16Char16: Self = Self(10);
    pub const StringLength16Char32: Self = Self(11);
    pub const BinaryLength16Char8: Self = Self(12);
    pub const Struct: Self = Self(13);

    pub const fn from_int(value: u8) -> Self {
        Self(value)
    }

    pub const fn as_int(self) -> u8 {
        self.0
    }

    /// Base encoding with all flags (array + chain) stripped.
    pub const fn without_flags(self) -> Self {
        Self(self.0 & Self::ValueMask)
    }

    /// This encoding with the chain flag cleared, array flags preserved.
    pub const fn without_chain_flag(self) -> Self {
        Self(self.0 & !Self::ChainFlag)
    }

    /// This encoding with the given flag bits set (e.g. `CArrayFlag`, `ChainFlag`).
    pub const fn with_flags(self, flags: u8) -> Self {
        Self(self.0 | flags)
    }

    /// The array-related flag bits (`CArrayFlag | VArrayFlag`) of this value.
    pub const fn array_flags(self) -> u8 {
        self.0 & Self::ArrayFlagMask
    }

    pub const fn has_chain_flag(self) -> bool {
        self.0 & Self::ChainFlag != 0
    }

    pub const fn is_constant_length_array(self) -> bool {
        self.0 & Self::CArrayFlag != 0
    }

    pub const fn is_variable_length_array(self) -> bool {
        self.0 & Self::VArrayFlag != 0
    }

    pub const fn is_array(self) -> bool {
        self.0 & Self::ArrayFlagMask != 0
    }

    /// Fixed element size in bytes for the base encoding, or 0 if the element
    /// size is not fixed (strings, struct).
    pub const fn element_size(self) -> u8 {
        match self.without_flags().0 {
            1 => 1,
            2 => 2,
            3 => 4,
            4 => 8,
            5 => 16,
            _ => 0,
        }
    }
}

impl fmt::Display for FieldEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self.without_flags().0 {
            0 => "Invalid",
            1 => "Value8",
            2 => "Value16",
            3 => "Value32",
            4 => "Value64",
            5 => "Value128",
            6 => "ZStringChar8",
            7 => "ZStringChar16",
            8 => "ZStringChar32",
            9 => "StringLength16Char8",
            10 => "StringLength16Char16",
            11 => "StringLength16Char32",
            12 => "BinaryLength16Char8",
            13 => "Struct",
            _ => "Unknown",
        };
        f.pad(name)
    }
}

/// Low 7 bits select the display format for a value's bytes; the high bit
/// (`ChainFlag`) indicates a provider-defined tag follows in the metadata.
#[repr(transparent)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub struct FieldFormat(pub u8);

impl FieldFormat {
    pub const ValueMask: u8 = 0x7F;
    pub const ChainFlag: u8 = 0x80;

    pub const Default: Self = Self(0);
    pub const UnsignedInt: Self = Self(1);
    pub const SignedInt: Self = Self(2);
    pub const HexInt: Self = Self(3);
    pub const Errno: Self = Self(4);
    pub const Pid: Self = Self(5);
    pub const Time: Self = Self(6);
    pub const Boolean: Self = Self(7);
    pub const Float: Self = Self(8);
    pub const HexBytes: Self = Self(9);
    pub const String8: Self = Self(10);
    pub const StringUtf: Self = Self(11);
    pub const StringUtfBom: Self = Self(12);
    pub const StringXml: Self = Self(13);
    pub const StringJson: Self = Self(14);
    pub const Uuid: Self = Self(15);
    pub const Port: Self = Self(16);
    /// Deprecated: 4-byte IPv4 address. New code should use [`Self::IPAddress`].
    pub const IPv4: Self = Self(17);
    /// Deprecated: 16-byte IPv6 address. New code should use [`Self::IPAddress`].
    pub const IPv6: Self = Self(18);
    /// Obsolete alias kept for providers that emitted it before `IPAddress`
    /// settled on its final value.
    pub const IPAddressObsolete: Self = Self(23);
    /// 4-byte field formats as IPv4, 16-byte field formats as IPv6.
    pub const IPAddress: Self = Self(24);

    pub const fn from_int(value: u8) -> Self {
        Self(value)
    }

    pub const fn as_int(self) -> u8 {
        self.0
    }

    /// This format with the chain flag cleared.
    pub const fn without_flags(self) -> Self {
        Self(self.0 & Self::ValueMask)
    }

    pub const fn has_chain_flag(self) -> bool {
        self.0 & Self::ChainFlag != 0
    }
}

impl fmt::Display for FieldFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self.without_flags().0 {
            0 => "Default",
            1 => "UnsignedInt",
            2 => "SignedInt",
            3 => "HexInt",
            4 => "Errno",
            5 => "Pid",
            6 => "Time",
            7 => "Boolean",
            8 => "Float",
            9 => "HexBytes",
            10 => "String8",
            11 => "StringUtf",
            12 => "StringUtfBom",
            13 => "StringXml",
            14 => "StringJson",
            15 => "Uuid",
            16 => "Port",
            17 => "IPv4",
            18 => "IPv6",
            23 => "IPAddressObsolete",
            24 => "IPAddress",
            _ => "Unknown",
        };
        f.pad(name)
    }
}

/// Flags in the 8-byte [`crate::EventHeader`] prelude: pointer size, byte
/// order, and whether extension blocks follow.
#[repr(transparent)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub struct HeaderFlags(pub u8);

impl HeaderFlags {
    pub const Pointer64: Self = Self(0x01);
    pub const LittleEndian: Self = Self(0x02);
    pub const Extension: Self = Self(0x04);

    /// No flags set: 32-bit pointers, big-endian, no extension blocks.
    pub const None: Self = Self(0);
    /// 32-bit pointers, big-endian, no extension blocks.
    pub const Default: Self = Self(0);
    /// 32-bit pointers, big-endian, at least one extension block follows.
    pub const DefaultWithExtension: Self = Self(Self::Extension.0);

    pub const fn from_int(value: u8) -> Self {
        Self(value)
    }

    pub const fn as_int(self) -> u8 {
        self.0
    }

    pub const fn has_flag(self, mask: Self) -> bool {
        0 != (self.0 & mask.0)
    }

    pub const fn or(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }
}

/// Special semantics for an event: informational, or the start/stop of a
/// logical activity.
#[repr(transparent)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub struct Opcode(pub u8);

impl Opcode {
    pub const Info: Self = Self(0);
    pub const ActivityStart: Self = Self(1);
    pub const ActivityStop: Self = Self(2);
    pub const CollectionStart: Self = Self(3);
    pub const CollectionStop: Self = Self(4);
    pub const Extension: Self = Self(5);
    pub const Reply: Self = Self(6);
    pub const Resume: Self = Self(7);
    pub const Suspend: Self = Self(8);
    pub const Send: Self = Self(9);
    pub const Receive: Self = Self(240);

    pub const fn from_int(value: u8) -> Self {
        Self(value)
    }

    pub const fn as_int(self) -> u8 {
        self.0
    }
}

/// Event severity: lower numbers are more severe.
#[repr(transparent)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub struct Level(pub u8);

impl Level {
    /// No level specified.
    pub const Invalid: Self = Self(0);
    pub const Critical: Self = Self(1);
    pub const Error: Self = Self(2);
    pub const Warning: Self = Self(3);
    pub const Informational: Self = Self(4);
    pub const Verbose: Self = Self(5);

    pub const fn from_int(value: u8) -> Self {
        Self(value)
    }

    pub const fn as_int(self) -> u8 {
        self.0
    }
}

/// Type of the data block following an [`crate::EventHeaderExtension`].
/// High bit is a chain flag: another extension block follows this one's data.
#[repr(transparent)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub struct ExtensionKind(pub u16);

impl ExtensionKind {
    pub const ValueMask: u16 = 0x7FFF;
    pub const ChainFlag: u16 = 0x8000;

    pub const Invalid: Self = Self(0);
    /// 16-byte activity id, optionally followed by a 16-byte related-activity id.
    pub const ActivityId: Self = Self(1);
    /// Provider name + field metadata chain describing the payload.
    pub const Metadata: Self = Self(5);

    pub const fn from_int(value: u16) -> Self {
        Self(value)
    }

    pub const fn as_int(self) -> u16 {
        self.0
    }

    pub const fn without_flags(self) -> Self {
        Self(self.0 & Self::ValueMask)
    }

    pub const fn has_chain_flag(self) -> bool {
        self.0 & Self::ChainFlag != 0
    }

    pub const fn has_flag(self, mask: Self) -> bool {
        0 != (self.0 & mask.0)
    }
}
