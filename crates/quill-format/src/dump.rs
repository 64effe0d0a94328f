//! Human-readable image dump for debugging.
//!
//! Sections are printed in the order the image holds them, so a duplicated
//! kind shows up twice. Entry indices are zero-padded to the width of their
//! table; byte payloads are previewed up to [`PREVIEW_BYTES`].

use std::fmt::Write as _;

use crate::colors::Colors;
use crate::entries::{
    DataClass, ExportKind, ImportKind, InitializedData, LocalVariable, ValueKind,
};
use crate::ids::ModuleIndex;
use crate::image::Image;
use crate::section::{KnownSection, OpaqueSection, Section};

/// Maximum number of bytes shown in a payload preview.
pub const PREVIEW_BYTES: usize = 16;

/// Generate a human-readable dump of the image.
pub fn dump(image: &Image, colors: Colors) -> String {
    let mut out = String::new();
    let c = &colors;

    writeln!(out, "{}[header]{}", c.blue, c.reset).unwrap();
    writeln!(out, "version = {}", image.version).unwrap();
    writeln!(out, "sections = {}", image.sections.len()).unwrap();

    for section in &image.sections {
        out.push('\n');
        match section {
            Section::Known { section, trailing } => {
                dump_known(&mut out, section, c);
                if !trailing.is_empty() {
                    dump_trailing(&mut out, trailing, c);
                }
            }
            Section::Opaque(opaque) => dump_opaque(&mut out, opaque, c),
        }
    }

    out
}

fn width_for_count(count: usize) -> usize {
    if count <= 1 {
        1
    } else {
        ((count - 1) as f64).log10().floor() as usize + 1
    }
}

fn hex_preview(bytes: &[u8]) -> String {
    let mut s = bytes
        .iter()
        .take(PREVIEW_BYTES)
        .map(|b| format!("{b:02x}"))
        .collect::<Vec<_>>()
        .join(" ");
    if bytes.len() > PREVIEW_BYTES {
        s.push_str(" ..");
    }
    s
}

fn value_kinds(kinds: &[ValueKind]) -> String {
    let names: Vec<_> = kinds.iter().map(|k| k.name()).collect();
    format!("({})", names.join(", "))
}

fn local(v: &LocalVariable) -> String {
    format!("{} len={} align={}", v.kind.name(), v.length, v.align)
}

fn data_prefix(class: DataClass) -> char {
    match class {
        DataClass::ReadOnly => 'R',
        DataClass::ReadWrite => 'W',
        DataClass::Uninit => 'U',
    }
}

fn export_prefix(kind: ExportKind) -> char {
    match kind.data_class() {
        Some(class) => data_prefix(class),
        None => 'F',
    }
}

fn dump_known(out: &mut String, section: &KnownSection, c: &Colors) {
    writeln!(out, "{}[{}]{}", c.blue, section.kind().name(), c.reset).unwrap();
    let w = width_for_count(section.len());

    match section {
        KnownSection::Property(p) => {
            writeln!(out, "name = {}{:?}{}", c.green, p.module_name, c.reset).unwrap();
            writeln!(out, "module_version = {}", p.module_version).unwrap();
        }
        KnownSection::Type(types) => {
            for (i, t) in types.iter().enumerate() {
                let params = value_kinds(&t.params);
                let results = value_kinds(&t.results);
                writeln!(out, "T{i:0w$} = {params} -> {results}").unwrap();
            }
        }
        KnownSection::Function(functions) => {
            for (i, f) in functions.iter().enumerate() {
                write!(
                    out,
                    "F{i:0w$} = T{} L{} code[{}]",
                    f.type_index,
                    f.local_list_index,
                    f.code.len()
                )
                .unwrap();
                if !f.code.is_empty() {
                    write!(out, "  {}; {}{}", c.dim, hex_preview(&f.code), c.reset).unwrap();
                }
                out.push('\n');
            }
        }
        KnownSection::LocalVariableList(lists) => {
            for (i, list) in lists.iter().enumerate() {
                let vars: Vec<_> = list.variables.iter().map(local).collect();
                if vars.is_empty() {
                    writeln!(out, "L{i:0w$} = {{}}").unwrap();
                } else {
                    writeln!(out, "L{i:0w$} = {{ {} }}", vars.join(", ")).unwrap();
                }
            }
        }
        KnownSection::ReadOnlyData(data) => {
            dump_initialized(out, data_prefix(DataClass::ReadOnly), data, w, c)
        }
        KnownSection::ReadWriteData(data) => {
            dump_initialized(out, data_prefix(DataClass::ReadWrite), data, w, c)
        }
        KnownSection::UninitData(data) => {
            for (i, d) in data.iter().enumerate() {
                writeln!(
                    out,
                    "U{i:0w$} = {} align={} len={}",
                    d.kind.name(),
                    d.align,
                    d.length
                )
                .unwrap();
            }
        }
        KnownSection::Import(imports) => {
            for (i, imp) in imports.iter().enumerate() {
                let target = match imp.kind {
                    ImportKind::Function { type_index } => format!("function T{type_index}"),
                    ImportKind::Data { class, kind } => {
                        format!("data {} {}", class.name(), kind.name())
                    }
                };
                writeln!(
                    out,
                    "I{i:0w$} = {}{:?}{}.{}{:?}{} {target}",
                    c.green, imp.module, c.reset, c.green, imp.name, c.reset
                )
                .unwrap();
            }
        }
        KnownSection::Export(exports) => {
            for (i, e) in exports.iter().enumerate() {
                writeln!(
                    out,
                    "E{i:0w$} = {}{:?}{} {}{}",
                    c.green,
                    e.name,
                    c.reset,
                    export_prefix(e.kind),
                    e.index
                )
                .unwrap();
            }
        }
        KnownSection::ExternalFunction(externals) => {
            for (i, x) in externals.iter().enumerate() {
                writeln!(
                    out,
                    "X{i:0w$} = {}{:?}{}.{}{:?}{} T{}",
                    c.green, x.library, c.reset, c.green, x.symbol, c.reset, x.type_index
                )
                .unwrap();
            }
        }
        KnownSection::StartFunction(starts) => {
            for f in starts {
                writeln!(out, "F{f}").unwrap();
            }
        }
        KnownSection::ImportModule(modules) => {
            for (i, m) in modules.iter().enumerate() {
                writeln!(
                    out,
                    "M{:0w$} = {}{:?}{} {}",
                    i + 1,
                    c.green,
                    m.name,
                    c.reset,
                    m.version
                )
                .unwrap();
            }
        }
        KnownSection::FunctionIndex(entries) => {
            for (i, e) in entries.iter().enumerate() {
                writeln!(out, "#{i:0w$} = {} F{}", module(e.module), e.function).unwrap();
            }
        }
        KnownSection::DataIndex(entries) => {
            for (i, e) in entries.iter().enumerate() {
                writeln!(
                    out,
                    "#{i:0w$} = {} {}{}",
                    module(e.module),
                    data_prefix(e.class),
                    e.index
                )
                .unwrap();
            }
        }
        KnownSection::ExternalFunctionIndex(entries) => {
            for (i, e) in entries.iter().enumerate() {
                writeln!(out, "X{i:0w$} = #{}", e.unified_index).unwrap();
            }
        }
    }
}

fn module(index: ModuleIndex) -> String {
    if index.is_local() {
        "local".to_string()
    } else {
        format!("M{index}")
    }
}

fn dump_trailing(out: &mut String, trailing: &[u8], c: &Colors) {
    writeln!(
        out,
        "trailing[{}]  {}; {}{}",
        trailing.len(),
        c.dim,
        hex_preview(trailing),
        c.reset
    )
    .unwrap();
}

fn dump_initialized(
    out: &mut String,
    prefix: char,
    data: &[InitializedData],
    w: usize,
    c: &Colors,
) {
    for (i, d) in data.iter().enumerate() {
        write!(
            out,
            "{prefix}{i:0w$} = {} align={} [{}]",
            d.kind.name(),
            d.align,
            d.bytes.len()
        )
        .unwrap();
        if !d.bytes.is_empty() {
            write!(out, "  {}; {}{}", c.dim, hex_preview(&d.bytes), c.reset).unwrap();
        }
        out.push('\n');
    }
}

fn dump_opaque(out: &mut String, section: &OpaqueSection, c: &Colors) {
    writeln!(out, "{}[unknown {:#04x}]{}", c.blue, section.tag, c.reset).unwrap();
    write!(out, "bytes[{}]", section.bytes.len()).unwrap();
    if !section.bytes.is_empty() {
        write!(out, "  {}; {}{}", c.dim, hex_preview(&section.bytes), c.reset).unwrap();
    }
    out.push('\n');
}
