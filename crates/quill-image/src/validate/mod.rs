//! Structural and referential checks over a decoded image.
//!
//! Checks run in classes, in this order:
//! 1. No section kind appears twice
//! 2. Every cross-table index is in bounds, imports name declared modules,
//!    and index sections cover their public index spaces
//! 3. Export names are unique per namespace; import module names are unique
//! 4. Bytecode is present; alignments are powers of two
//! 5. The start function, if any, is unique and takes and returns nothing
//!
//! Findings accumulate within a class; the first class with findings stops
//! validation, so later checks can rely on earlier ones (class 5 indexes
//! tables that class 2 proved in bounds).

mod findings;

#[cfg(test)]
mod validate_tests;

use std::collections::HashSet;

use quill_format::{
    DataClass, ExportKind, Image, ImportKind, LocalVariableList, ModuleIndex, SectionKind,
};

pub use findings::{Finding, Findings, Reason, StartProblem};

/// Validate an image, reporting only the first finding.
pub fn validate(image: &Image) -> Result<(), Findings> {
    validate_all(image).map_err(Findings::into_first)
}

/// Validate an image, reporting every finding of the first failing class.
pub fn validate_all(image: &Image) -> Result<(), Findings> {
    Validator::new(image).run()
}

struct Validator<'a> {
    image: &'a Image,
    findings: Vec<Finding>,
}

impl<'a> Validator<'a> {
    fn new(image: &'a Image) -> Self {
        Self {
            image,
            findings: Vec::new(),
        }
    }

    fn run(mut self) -> Result<(), Findings> {
        self.check_duplicate_sections();
        self.finish_class()?;
        self.check_indices();
        self.finish_class()?;
        self.check_names();
        self.finish_class()?;
        self.check_contents();
        self.finish_class()?;
        self.check_start_function();
        self.finish_class()
    }

    fn finish_class(&mut self) -> Result<(), Findings> {
        match Findings::from_vec(std::mem::take(&mut self.findings)) {
            Some(findings) => Err(findings),
            None => Ok(()),
        }
    }

    fn report(&mut self, section: SectionKind, index: Option<usize>, reason: Reason) {
        self.findings.push(Finding::new(section, index, reason));
    }

    fn check_bound(
        &mut self,
        section: SectionKind,
        entry: usize,
        target: SectionKind,
        index: u32,
        len: usize,
    ) {
        if index as usize >= len {
            self.report(
                section,
                Some(entry),
                Reason::InvalidIndex { target, index, len },
            );
        }
    }

    /// Check a module reference; true when the target is this image.
    fn check_module(&mut self, section: SectionKind, entry: usize, module: ModuleIndex) -> bool {
        let count = self.image.import_modules().len();
        match module.import_module() {
            None => true,
            Some(position) => {
                if position >= count {
                    self.report(
                        section,
                        Some(entry),
                        Reason::InvalidModule {
                            module: module.get(),
                            count,
                        },
                    );
                }
                false
            }
        }
    }

    fn check_coverage(&mut self, section: SectionKind, expected: usize, actual: usize) {
        if self.image.section(section).is_some() && actual != expected {
            self.report(
                section,
                None,
                Reason::IndexTableLength { expected, actual },
            );
        }
    }

    fn data_len(&self, class: DataClass) -> usize {
        match class {
            DataClass::ReadOnly => self.image.read_only_data().len(),
            DataClass::ReadWrite => self.image.read_write_data().len(),
            DataClass::Uninit => self.image.uninit_data().len(),
        }
    }

    fn check_duplicate_sections(&mut self) {
        let mut seen = HashSet::new();
        for section in &self.image.sections {
            let kind = section.kind();
            if !seen.insert(kind) {
                self.report(kind, None, Reason::DuplicateSection);
            }
        }
    }

    fn check_indices(&mut self) {
        let image = self.image;
        let types = image.types().len();
        let lists = image.local_variable_lists().len();
        let functions = image.functions().len();

        for (i, f) in image.functions().iter().enumerate() {
            let s = SectionKind::Function;
            self.check_bound(s, i, SectionKind::Type, f.type_index.get(), types);
            self.check_bound(
                s,
                i,
                SectionKind::LocalVariableList,
                f.local_list_index.get(),
                lists,
            );
        }

        let modules_declared = image.section(SectionKind::ImportModule).is_some();
        for (i, imp) in image.imports().iter().enumerate() {
            if modules_declared && image.import_module(&imp.module).is_none() {
                self.report(
                    SectionKind::Import,
                    Some(i),
                    Reason::UndeclaredModule {
                        name: imp.module.clone(),
                    },
                );
            }
            if let ImportKind::Function { type_index } = imp.kind {
                self.check_bound(
                    SectionKind::Import,
                    i,
                    SectionKind::Type,
                    type_index.get(),
                    types,
                );
            }
        }

        for (i, e) in image.exports().iter().enumerate() {
            let (target, len) = match e.kind {
                ExportKind::Function => (SectionKind::Function, functions),
                ExportKind::ReadOnlyData => {
                    (SectionKind::ReadOnlyData, image.read_only_data().len())
                }
                ExportKind::ReadWriteData => {
                    (SectionKind::ReadWriteData, image.read_write_data().len())
                }
                ExportKind::UninitData => (SectionKind::UninitData, image.uninit_data().len()),
            };
            self.check_bound(SectionKind::Export, i, target, e.index, len);
        }

        for (i, x) in image.external_functions().iter().enumerate() {
            self.check_bound(
                SectionKind::ExternalFunction,
                i,
                SectionKind::Type,
                x.type_index.get(),
                types,
            );
        }

        for (i, f) in image.start_functions().iter().enumerate() {
            self.check_bound(
                SectionKind::StartFunction,
                i,
                SectionKind::Function,
                f.get(),
                functions,
            );
        }

        self.check_index_sections();
    }

    fn check_index_sections(&mut self) {
        let image = self.image;

        for (i, e) in image.function_index().iter().enumerate() {
            let s = SectionKind::FunctionIndex;
            if self.check_module(s, i, e.module) {
                let len = image.functions().len();
                self.check_bound(s, i, SectionKind::Function, e.function.get(), len);
            }
        }
        self.check_coverage(
            SectionKind::FunctionIndex,
            image.public_function_count(),
            image.function_index().len(),
        );

        for (i, e) in image.data_index().iter().enumerate() {
            let s = SectionKind::DataIndex;
            if self.check_module(s, i, e.module) {
                let target = match e.class {
                    DataClass::ReadOnly => SectionKind::ReadOnlyData,
                    DataClass::ReadWrite => SectionKind::ReadWriteData,
                    DataClass::Uninit => SectionKind::UninitData,
                };
                let len = self.data_len(e.class);
                self.check_bound(s, i, target, e.index, len);
            }
        }
        self.check_coverage(
            SectionKind::DataIndex,
            image.public_data_count(),
            image.data_index().len(),
        );

        self.check_coverage(
            SectionKind::ExternalFunctionIndex,
            image.external_functions().len(),
            image.external_function_index().len(),
        );
    }

    fn check_names(&mut self) {
        let mut seen = HashSet::new();
        for (i, e) in self.image.exports().iter().enumerate() {
            if !seen.insert((e.kind.namespace(), e.name.as_str())) {
                self.report(
                    SectionKind::Export,
                    Some(i),
                    Reason::DuplicateExportName {
                        name: e.name.clone(),
                    },
                );
            }
        }

        let mut modules = HashSet::new();
        for (i, m) in self.image.import_modules().iter().enumerate() {
            if !modules.insert(m.name.as_str()) {
                self.report(
                    SectionKind::ImportModule,
                    Some(i),
                    Reason::DuplicateModuleName {
                        name: m.name.clone(),
                    },
                );
            }
        }
    }

    fn check_contents(&mut self) {
        let image = self.image;

        for (i, f) in image.functions().iter().enumerate() {
            if f.code.is_empty() {
                self.report(SectionKind::Function, Some(i), Reason::EmptyBytecode);
            }
        }

        for (i, list) in image.local_variable_lists().iter().enumerate() {
            self.check_list_alignment(i, list);
        }

        let initialized = [
            (SectionKind::ReadOnlyData, image.read_only_data()),
            (SectionKind::ReadWriteData, image.read_write_data()),
        ];
        for (section, data) in initialized {
            for (i, d) in data.iter().enumerate() {
                self.check_alignment(section, i, d.align);
            }
        }
        for (i, d) in image.uninit_data().iter().enumerate() {
            self.check_alignment(SectionKind::UninitData, i, d.align);
        }
    }

    fn check_list_alignment(&mut self, list_index: usize, list: &LocalVariableList) {
        for (variable, v) in list.variables.iter().enumerate() {
            if !v.align.is_power_of_two() {
                self.report(
                    SectionKind::LocalVariableList,
                    Some(list_index),
                    Reason::InvalidVariableAlignment {
                        variable,
                        align: v.align,
                    },
                );
            }
        }
    }

    fn check_alignment(&mut self, section: SectionKind, index: usize, align: u16) {
        if !align.is_power_of_two() {
            self.report(section, Some(index), Reason::InvalidAlignment { align });
        }
    }

    fn check_start_function(&mut self) {
        if self.image.section(SectionKind::StartFunction).is_none() {
            return;
        }

        let starts = self.image.start_functions();
        if starts.len() != 1 {
            self.report(
                SectionKind::StartFunction,
                None,
                Reason::InvalidStartFunction(StartProblem::Count(starts.len())),
            );
            return;
        }

        // Both indices were bounds-checked in an earlier class.
        let accepted = self
            .image
            .signature_of(starts[0])
            .is_some_and(|sig| sig.params.is_empty() && sig.results.is_empty());
        if !accepted {
            self.report(
                SectionKind::StartFunction,
                Some(0),
                Reason::InvalidStartFunction(StartProblem::Signature),
            );
        }
    }
}
