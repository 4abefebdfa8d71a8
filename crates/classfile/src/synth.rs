//! Minimal class-file synthesiser for tests.
//!
//! Produces structurally valid class files (no bytecode) that exercise the constant pool,
//! member tables and the `InnerClasses`/`SourceFile` attributes.

use std::collections::HashMap;

#[derive(Default)]
struct PoolBuilder {
    bytes: Vec<u8>,
    next_index: u16,
    utf8: HashMap<String, u16>,
    classes: HashMap<String, u16>,
}

impl PoolBuilder {
    fn new() -> Self {
        Self {
            next_index: 1,
            ..Self::default()
        }
    }

    fn utf8(&mut self, value: &str) -> u16 {
        if let Some(index) = self.utf8.get(value) {
            return *index;
        }
        let index = self.next_index;
        self.bytes.push(1);
        self.bytes
            .extend_from_slice(&(value.len() as u16).to_be_bytes());
        self.bytes.extend_from_slice(value.as_bytes());
        self.next_index += 1;
        self.utf8.insert(value.to_string(), index);
        index
    }

    fn class(&mut self, name: &str) -> u16 {
        if let Some(index) = self.classes.get(name) {
            return *index;
        }
        let name_index = self.utf8(name);
        let index = self.next_index;
        self.bytes.push(7);
        self.bytes.extend_from_slice(&name_index.to_be_bytes());
        self.next_index += 1;
        self.classes.insert(name.to_string(), index);
        index
    }

    fn long(&mut self, value: i64) {
        self.bytes.push(5);
        self.bytes.extend_from_slice(&value.to_be_bytes());
        self.next_index += 2;
    }
}

struct Member {
    name: String,
    descriptor: String,
    flags: u16,
}

pub struct ClassFileBuilder {
    name: String,
    flags: u16,
    super_name: Option<String>,
    interfaces: Vec<String>,
    fields: Vec<Member>,
    methods: Vec<Member>,
    inner_classes: Vec<(String, u16)>,
    long_constants: Vec<i64>,
    source_file: Option<String>,
}

impl ClassFileBuilder {
    pub fn new(name: impl Into<String>, flags: u16) -> Self {
        Self {
            name: name.into(),
            flags,
            super_name: Some("java/lang/Object".to_string()),
            interfaces: Vec::new(),
            fields: Vec::new(),
            methods: Vec::new(),
            inner_classes: Vec::new(),
            long_constants: Vec::new(),
            source_file: None,
        }
    }

    pub fn super_class(mut self, name: impl Into<String>) -> Self {
        self.super_name = Some(name.into());
        self
    }

    pub fn no_super_class(mut self) -> Self {
        self.super_name = None;
        self
    }

    pub fn interface(mut self, name: impl Into<String>) -> Self {
        self.interfaces.push(name.into());
        self
    }

    pub fn field(mut self, name: &str, descriptor: &str, flags: u16) -> Self {
        self.fields.push(Member {
            name: name.to_string(),
            descriptor: descriptor.to_string(),
            flags,
        });
        self
    }

    pub fn method(mut self, name: &str, descriptor: &str, flags: u16) -> Self {
        self.methods.push(Member {
            name: name.to_string(),
            descriptor: descriptor.to_string(),
            flags,
        });
        self
    }

    pub fn inner_class(mut self, name: impl Into<String>, flags: u16) -> Self {
        self.inner_classes.push((name.into(), flags));
        self
    }

    pub fn long_constant(mut self, value: i64) -> Self {
        self.long_constants.push(value);
        self
    }

    pub fn source_file(mut self, name: impl Into<String>) -> Self {
        self.source_file = Some(name.into());
        self
    }

    pub fn build(self) -> Vec<u8> {
        let mut pool = PoolBuilder::new();
        for value in &self.long_constants {
            pool.long(*value);
        }

        let this_index = pool.class(&self.name);
        let super_index = self
            .super_name
            .as_deref()
            .map_or(0, |name| pool.class(name));
        let interface_indices: Vec<u16> =
            self.interfaces.iter().map(|name| pool.class(name)).collect();

        let mut body = Vec::new();
        body.extend_from_slice(&self.flags.to_be_bytes());
        body.extend_from_slice(&this_index.to_be_bytes());
        body.extend_from_slice(&super_index.to_be_bytes());
        body.extend_from_slice(&(interface_indices.len() as u16).to_be_bytes());
        for index in interface_indices {
            body.extend_from_slice(&index.to_be_bytes());
        }

        for members in [&self.fields, &self.methods] {
            body.extend_from_slice(&(members.len() as u16).to_be_bytes());
            for member in members {
                let name_index = pool.utf8(&member.name);
                let descriptor_index = pool.utf8(&member.descriptor);
                body.extend_from_slice(&member.flags.to_be_bytes());
                body.extend_from_slice(&name_index.to_be_bytes());
                body.extend_from_slice(&descriptor_index.to_be_bytes());
                body.extend_from_slice(&0u16.to_be_bytes());
            }
        }

        let mut attributes: Vec<(u16, Vec<u8>)> = Vec::new();
        if let Some(source) = &self.source_file {
            let name_index = pool.utf8("SourceFile");
            let value_index = pool.utf8(source);
            attributes.push((name_index, value_index.to_be_bytes().to_vec()));
        }
        if !self.inner_classes.is_empty() {
            let name_index = pool.utf8("InnerClasses");
            let mut data = Vec::new();
            data.extend_from_slice(&(self.inner_classes.len() as u16).to_be_bytes());
            for (inner, flags) in &self.inner_classes {
                let inner_index = pool.class(inner);
                let (outer_index, simple_index) = match inner.rsplit_once('$') {
                    Some((outer, simple)) => (pool.class(outer), pool.utf8(simple)),
                    None => (0, 0),
                };
                data.extend_from_slice(&inner_index.to_be_bytes());
                data.extend_from_slice(&outer_index.to_be_bytes());
                data.extend_from_slice(&simple_index.to_be_bytes());
                data.extend_from_slice(&flags.to_be_bytes());
            }
            attributes.push((name_index, data));
        }

        body.extend_from_slice(&(attributes.len() as u16).to_be_bytes());
        for (name_index, data) in attributes {
            body.extend_from_slice(&name_index.to_be_bytes());
            body.extend_from_slice(&(data.len() as u32).to_be_bytes());
            body.extend_from_slice(&data);
        }

        let mut out = Vec::with_capacity(10 + pool.bytes.len() + body.len());
        out.extend_from_slice(&0xCAFE_BABEu32.to_be_bytes());
        out.extend_from_slice(&0u16.to_be_bytes());
        out.extend_from_slice(&61u16.to_be_bytes());
        out.extend_from_slice(&pool.next_index.to_be_bytes());
        out.extend_from_slice(&pool.bytes);
        out.extend_from_slice(&body);
        out
    }
}
