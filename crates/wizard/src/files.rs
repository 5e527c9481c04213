use crate::error::WizardError;
use crate::model::{FileMeta, FileRef, FileSide, SheetMeta, SheetPair};
use crate::warning::Warning;

/// Upper bound on simultaneously selected files.
pub const MAX_SELECTED: usize = 2;

/// A selected file plus its fetched metadata (absent until the paired
/// details fetch lands).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    pub file_name: String,
    pub sheet_name: Option<String>,
    meta: Option<FileMeta>,
}

impl SelectedFile {
    fn new(file_name: &str) -> Self {
        Self { file_name: file_name.to_string(), sheet_name: None, meta: None }
    }

    pub fn meta(&self) -> Option<&FileMeta> {
        self.meta.as_ref()
    }

    pub fn file_ref(&self) -> FileRef {
        FileRef { file_name: self.file_name.clone(), sheet_name: self.sheet_name.clone() }
    }

    /// Metadata of the bound sheet, if both the binding and the fetch exist.
    pub fn sheet_meta(&self) -> Option<&SheetMeta> {
        let sheet = self.sheet_name.as_deref()?;
        self.meta.as_ref()?.sheets.get(sheet)
    }
}

/// Opaque fence for metadata fetches: captured when a fetch starts, checked
/// when its result is applied. A selection change in between invalidates it,
/// so a superseded fetch can never overwrite newer state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetadataTicket(u64);

/// The 0–2 files the wizard currently operates on.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileSelection {
    slots: Vec<SelectedFile>,
    generation: u64,
}

impl FileSelection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn is_pair(&self) -> bool {
        self.slots.len() == MAX_SELECTED
    }

    pub fn get(&self, index: usize) -> Option<&SelectedFile> {
        self.slots.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &SelectedFile> {
        self.slots.iter()
    }

    /// Toggle a file in or out of the selection. Selecting a third file is
    /// rejected with a warning and changes nothing.
    pub fn toggle(&mut self, file_name: &str) -> Option<Warning> {
        if let Some(pos) = self.slots.iter().position(|s| s.file_name == file_name) {
            self.slots.remove(pos);
            self.generation += 1;
            return None;
        }
        if self.slots.len() >= MAX_SELECTED {
            return Some(Warning::SelectionLimit);
        }
        self.slots.push(SelectedFile::new(file_name));
        self.generation += 1;
        None
    }

    pub fn deselect(&mut self, index: usize) -> Result<(), WizardError> {
        if index >= self.slots.len() {
            return Err(WizardError::NoSuchFile { index });
        }
        self.slots.remove(index);
        self.generation += 1;
        Ok(())
    }

    /// Bind a sheet for one file. Independent per file; validated against
    /// metadata when the paired fetch has already landed.
    pub fn set_sheet(&mut self, index: usize, sheet: &str) -> Result<(), WizardError> {
        let slot = self
            .slots
            .get_mut(index)
            .ok_or(WizardError::NoSuchFile { index })?;
        if let Some(meta) = &slot.meta {
            if !meta.sheets.contains_key(sheet) {
                return Err(WizardError::UnknownSheet {
                    file: slot.file_name.clone(),
                    sheet: sheet.to_string(),
                });
            }
        }
        slot.sheet_name = Some(sheet.to_string());
        Ok(())
    }

    /// Drop sheet bindings and metadata, keeping the file names. Used when
    /// the selection falls below a pair and downstream state resets.
    pub fn clear_bindings(&mut self) {
        for slot in &mut self.slots {
            slot.sheet_name = None;
            slot.meta = None;
        }
    }

    /// Start a metadata fetch for the current pair.
    pub fn metadata_ticket(&self) -> Result<MetadataTicket, WizardError> {
        if !self.is_pair() {
            return Err(WizardError::TwoFilesRequired { selected: self.slots.len() });
        }
        Ok(MetadataTicket(self.generation))
    }

    /// Install both files' metadata as one atomic update. Rejects results
    /// from a fetch that started before the selection last changed.
    /// Single-sheet files (CSV) get their sole sheet bound automatically.
    pub fn apply_metadata(
        &mut self,
        ticket: MetadataTicket,
        meta1: FileMeta,
        meta2: FileMeta,
    ) -> Result<(), WizardError> {
        if ticket.0 != self.generation {
            return Err(WizardError::StaleMetadata { ticket: ticket.0, current: self.generation });
        }
        if !self.is_pair() {
            return Err(WizardError::TwoFilesRequired { selected: self.slots.len() });
        }
        for (slot, meta) in self.slots.iter_mut().zip([meta1, meta2]) {
            if slot.sheet_name.is_none() {
                slot.sheet_name = meta.sole_sheet().map(str::to_string);
            }
            slot.meta = Some(meta);
        }
        Ok(())
    }

    /// Bound-sheet metadata for one side, when available.
    pub fn sheet_meta(&self, side: FileSide) -> Option<&SheetMeta> {
        self.slots.get(side.index()).and_then(|s| s.sheet_meta())
    }

    pub fn sheet_pair(&self) -> SheetPair<'_> {
        SheetPair {
            file1: self.sheet_meta(FileSide::File1),
            file2: self.sheet_meta(FileSide::File2),
        }
    }
}
