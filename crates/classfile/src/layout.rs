use crate::error::{ClassFileError, Result};
use crate::reader::ClassReader;

/// Location and current value of an `access_flags` word
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlagSite {
    pub offset: usize,
    pub flags: u16,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberLayout {
    pub name: String,
    pub descriptor: String,
    pub access: FlagSite,
}

/// One entry of the `InnerClasses` attribute
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InnerClassLayout {
    pub inner_name: String,
    pub access: FlagSite,
}

/// The parts of a class file needed to locate and rewrite access flags
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassLayout {
    pub name: String,
    pub super_name: Option<String>,
    pub interfaces: Vec<String>,
    pub access: FlagSite,
    pub fields: Vec<MemberLayout>,
    pub methods: Vec<MemberLayout>,
    pub inner_classes: Vec<InnerClassLayout>,
}

impl ClassLayout {
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        let mut reader = ClassReader::new(bytes);
        reader.expect_magic()?;
        let _minor_version = reader.read_u2()?;
        let _major_version = reader.read_u2()?;
        let pool = ConstantPool::parse(&mut reader)?;

        let access = read_flag_site(&mut reader)?;
        let this_class = reader.read_u2()?;
        let super_class = reader.read_u2()?;

        let interfaces_count = reader.read_u2()?;
        let mut interfaces = Vec::with_capacity(interfaces_count as usize);
        for _ in 0..interfaces_count {
            interfaces.push(pool.class_name(reader.read_u2()?)?.to_string());
        }

        let fields = read_members(&mut reader, &pool)?;
        let methods = read_members(&mut reader, &pool)?;

        let mut inner_classes = Vec::new();
        let attributes_count = reader.read_u2()?;
        for _ in 0..attributes_count {
            let attribute_name = pool.utf8(reader.read_u2()?)?;
            let length = reader.read_u4()? as usize;
            if attribute_name != "InnerClasses" {
                reader.skip(length)?;
                continue;
            }

            let number_of_classes = reader.read_u2()?;
            for _ in 0..number_of_classes {
                let inner_class_info_index = reader.read_u2()?;
                reader.read_u2()?; // outer_class_info_index
                reader.read_u2()?; // inner_name_index
                let access = read_flag_site(&mut reader)?;
                inner_classes.push(InnerClassLayout {
                    inner_name: pool.class_name(inner_class_info_index)?.to_string(),
                    access,
                });
            }
        }

        let super_name = if super_class == 0 {
            None
        } else {
            Some(pool.class_name(super_class)?.to_string())
        };

        Ok(Self {
            name: pool.class_name(this_class)?.to_string(),
            super_name,
            interfaces,
            access,
            fields,
            methods,
            inner_classes,
        })
    }

    pub fn field(&self, name: &str, descriptor: &str) -> Option<&MemberLayout> {
        find_member(&self.fields, name, descriptor)
    }

    pub fn method(&self, name: &str, descriptor: &str) -> Option<&MemberLayout> {
        find_member(&self.methods, name, descriptor)
    }
}

/// Overwrite the flags word at `site` with `flags`. Returns whether the bytes changed.
pub fn write_flags(bytes: &mut [u8], site: FlagSite, flags: u16) -> Result<bool> {
    let slot = bytes
        .get_mut(site.offset..site.offset + 2)
        .ok_or(ClassFileError::InvalidFlagSite {
            offset: site.offset,
        })?;
    let encoded = flags.to_be_bytes();
    if *slot == encoded {
        return Ok(false);
    }
    slot.copy_from_slice(&encoded);
    Ok(true)
}

fn find_member<'a>(
    members: &'a [MemberLayout],
    name: &str,
    descriptor: &str,
) -> Option<&'a MemberLayout> {
    members
        .iter()
        .find(|member| member.name == name && member.descriptor == descriptor)
}

fn read_flag_site(reader: &mut ClassReader<'_>) -> Result<FlagSite> {
    let offset = reader.position();
    let flags = reader.read_u2()?;
    Ok(FlagSite { offset, flags })
}

fn read_members(reader: &mut ClassReader<'_>, pool: &ConstantPool) -> Result<Vec<MemberLayout>> {
    let count = reader.read_u2()?;
    let mut members = Vec::with_capacity(count as usize);
    for _ in 0..count {
        let access = read_flag_site(reader)?;
        let name = pool.utf8(reader.read_u2()?)?.to_string();
        let descriptor = pool.utf8(reader.read_u2()?)?.to_string();
        let attributes_count = reader.read_u2()?;
        skip_attributes(reader, attributes_count)?;
        members.push(MemberLayout {
            name,
            descriptor,
            access,
        });
    }
    Ok(members)
}

fn skip_attributes(reader: &mut ClassReader<'_>, count: u16) -> Result<()> {
    for _ in 0..count {
        reader.read_u2()?; // attribute_name_index
        let length = reader.read_u4()? as usize;
        reader.skip(length)?;
    }
    Ok(())
}

#[derive(Debug, Clone)]
enum Constant {
    Utf8(String),
    Class { name_index: u16 },
    Other,
    Unusable,
}

struct ConstantPool {
    entries: Vec<Constant>,
}

impl ConstantPool {
    fn parse(reader: &mut ClassReader<'_>) -> Result<Self> {
        let count = reader.read_u2()? as usize;
        let mut entries = Vec::with_capacity(count);
        entries.push(Constant::Unusable); // index 0 unused

        let mut index = 1;
        while index < count {
            let tag = reader.read_u1()?;
            let entry = match tag {
                1 => {
                    let length = reader.read_u2()? as usize;
                    let bytes = reader.read_slice(length)?;
                    // Modified UTF-8 differs from UTF-8 only outside the names we match on.
                    Constant::Utf8(String::from_utf8_lossy(bytes).into_owned())
                }
                3 | 4 => {
                    reader.skip(4)?;
                    Constant::Other
                }
                5 | 6 => {
                    reader.skip(8)?;
                    entries.push(Constant::Other);
                    index += 1;
                    Constant::Unusable
                }
                7 => Constant::Class {
                    name_index: reader.read_u2()?,
                },
                8 | 16 | 19 | 20 => {
                    reader.skip(2)?;
                    Constant::Other
                }
                9 | 10 | 11 | 12 | 17 | 18 => {
                    reader.skip(4)?;
                    Constant::Other
                }
                15 => {
                    reader.skip(3)?;
                    Constant::Other
                }
                other => return Err(ClassFileError::UnsupportedConstant { tag: other }),
            };

            entries.push(entry);
            index += 1;
        }

        Ok(Self { entries })
    }

    fn get(&self, index: u16) -> Result<&Constant> {
        self.entries
            .get(index as usize)
            .ok_or(ClassFileError::InvalidConstantIndex { index })
    }

    fn utf8(&self, index: u16) -> Result<&str> {
        match self.get(index)? {
            Constant::Utf8(value) => Ok(value.as_str()),
            _ => Err(ClassFileError::InvalidConstantIndex { index }),
        }
    }

    fn class_name(&self, index: u16) -> Result<&str> {
        match self.get(index)? {
            Constant::Class { name_index } => self.utf8(*name_index),
            _ => Err(ClassFileError::InvalidConstantIndex { index }),
        }
    }
}
