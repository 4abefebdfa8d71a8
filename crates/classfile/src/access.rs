//! JVM access flag bits and the widening rules built from them.

pub const ACC_PUBLIC: u16 = 0x0001;
pub const ACC_PRIVATE: u16 = 0x0002;
pub const ACC_PROTECTED: u16 = 0x0004;
pub const ACC_STATIC: u16 = 0x0008;
pub const ACC_FINAL: u16 = 0x0010;
pub const ACC_INTERFACE: u16 = 0x0200;

const VISIBILITY_MASK: u16 = ACC_PUBLIC | ACC_PRIVATE | ACC_PROTECTED;

#[must_use]
pub const fn make_public(flags: u16) -> u16 {
    (flags & !VISIBILITY_MASK) | ACC_PUBLIC
}

/// Protected unless already public
#[must_use]
pub const fn make_protected(flags: u16) -> u16 {
    if flags & ACC_PUBLIC != 0 {
        flags
    } else {
        (flags & !VISIBILITY_MASK) | ACC_PROTECTED
    }
}

#[must_use]
pub const fn remove_final(flags: u16) -> u16 {
    flags & !ACC_FINAL
}

/// A private instance method that becomes visible must stay non-virtual in behaviour
#[must_use]
pub fn make_final_if_private(flags: u16, name: &str) -> u16 {
    let private_instance = flags & ACC_PRIVATE != 0 && flags & ACC_STATIC == 0;
    if private_instance && name != "<init>" && name != "<clinit>" {
        flags | ACC_FINAL
    } else {
        flags
    }
}
