use std::collections::{HashMap, HashSet};

use indexmap::{IndexMap, IndexSet};

use idlmux_ir::maps::MapWarnings;
use idlmux_ir::UsageMap;
use idlmux_spec::types::error::ErrorEntry;

/// Tracks state during a single emission: indentation and collected imports.
#[derive(Debug, Clone)]
pub struct EmitContext {
    /// Current indentation level
    indent_level: usize,
    /// Characters per indent (e.g., 2 spaces)
    indent_width: usize,
    /// Whether to use tabs
    use_tabs: bool,
    /// Collected import paths (deduped, insertion-ordered)
    imports: IndexSet<String>,
}

/// Indentation style configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndentStyle {
    Spaces(usize),
    Tabs,
}

impl EmitContext {
    pub fn new(style: IndentStyle) -> Self {
        let (use_tabs, indent_width) = match style {
            IndentStyle::Spaces(n) => (false, n),
            IndentStyle::Tabs => (true, 1),
        };
        Self {
            indent_level: 0,
            indent_width,
            use_tabs,
            imports: IndexSet::new(),
        }
    }

    /// Get the current indentation string.
    pub fn indent(&self) -> String {
        let unit = if self.use_tabs { "\t" } else { " " };
        unit.repeat(self.indent_level * self.indent_width)
    }

    /// `text` at the current indentation.
    pub fn line(&self, text: impl AsRef<str>) -> String {
        format!("{}{}", self.indent(), text.as_ref())
    }

    /// Increase indentation by one level.
    pub fn push_indent(&mut self) {
        self.indent_level += 1;
    }

    /// Decrease indentation by one level.
    pub fn pop_indent(&mut self) {
        self.indent_level = self.indent_level.saturating_sub(1);
    }

    /// Add an import path to the collection (deduped).
    pub fn add_import(&mut self, path: impl Into<String>) {
        self.imports.insert(path.into());
    }

    /// Get all collected imports.
    pub fn imports(&self) -> &IndexSet<String> {
        &self.imports
    }

    /// Drain and return all collected imports.
    pub fn take_imports(&mut self) -> IndexSet<String> {
        std::mem::take(&mut self.imports)
    }

    /// Current indent level.
    pub fn indent_level(&self) -> usize {
        self.indent_level
    }
}

/// A synthesized key/value record standing in for one map pairing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryType {
    pub name: String,
    /// Key type as the target spells it
    pub key: String,
    /// Value type in output position
    pub value: String,
    /// Value type in input position
    pub value_input: String,
    /// `map<key, value>` as declared, for the description
    pub described: String,
}

/// An auto-named record holding one nested map as a list of entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrapperType {
    pub name: String,
    /// Entry type of the wrapped map; empty until its synthesis finishes
    pub entry: String,
}

/// Per-emission arena of synthesized map types.
///
/// Entries are deduplicated by their (key, value) pairing as the target
/// spells it. Two pairings that derive the same name keep apart through a
/// numeric suffix. Wrappers are indexed by the structural signature of the
/// nested map they hold and are numbered in allocation order.
#[derive(Debug, Clone, Default)]
pub struct MapTypeArena {
    usage: UsageMap,
    entries: IndexMap<String, EntryType>,
    by_pairing: HashMap<(String, String), String>,
    wrappers: Vec<WrapperType>,
    by_signature: HashMap<String, usize>,
    unknown_value_used: bool,
    reported: HashSet<(String, String)>,
    warnings: MapWarnings,
}

impl MapTypeArena {
    /// An empty arena. `usage` decides which declared map values have an
    /// input variant.
    pub fn new(usage: UsageMap) -> Self {
        Self {
            usage,
            ..Self::default()
        }
    }

    pub fn usage(&self) -> &UsageMap {
        &self.usage
    }

    /// Record an entry type unless one for the same pairing exists.
    /// Returns the entry name.
    pub fn intern_entry(&mut self, mut entry: EntryType) -> String {
        let pairing = (entry.key.clone(), entry.value.clone());
        if let Some(name) = self.by_pairing.get(&pairing) {
            return name.clone();
        }

        let base = entry.name.clone();
        let mut suffix = 2;
        while self.entries.contains_key(&entry.name) {
            entry.name = format!("{base}{suffix}");
            suffix += 1;
        }
        let name = entry.name.clone();
        self.by_pairing.insert(pairing, name.clone());
        self.entries.insert(name.clone(), entry);
        name
    }

    /// Wrapper already allocated for `signature`.
    pub fn wrapper_for(&self, signature: &str) -> Option<&str> {
        self.by_signature
            .get(signature)
            .map(|&index| self.wrappers[index].name.as_str())
    }

    /// Allocate `MapWrapper<N>` for `signature` and return its index.
    /// The index is registered before the wrapped map is synthesized, so a
    /// recursive visit of the same shape reuses it.
    pub fn allocate_wrapper(&mut self, signature: String) -> usize {
        let index = self.wrappers.len();
        self.wrappers.push(WrapperType {
            name: format!("MapWrapper{index}"),
            entry: String::new(),
        });
        self.by_signature.insert(signature, index);
        index
    }

    pub fn complete_wrapper(&mut self, index: usize, entry: String) {
        if let Some(wrapper) = self.wrappers.get_mut(index) {
            wrapper.entry = entry;
        }
    }

    pub fn wrapper_name(&self, index: usize) -> &str {
        &self.wrappers[index].name
    }

    pub fn entries(&self) -> impl Iterator<Item = &EntryType> {
        self.entries.values()
    }

    pub fn wrappers(&self) -> &[WrapperType] {
        &self.wrappers
    }

    /// Record a value shape that fell back to the placeholder. Each shape is
    /// reported once per namespace however often it is synthesized.
    pub fn unknown_value(&mut self, shape: &str, namespace: &str) {
        self.unknown_value_used = true;
        if self
            .reported
            .insert((shape.to_string(), namespace.to_string()))
        {
            self.warnings.unknown_value(shape, namespace);
        }
    }

    pub fn uses_unknown_value(&self) -> bool {
        self.unknown_value_used
    }

    pub fn take_warnings(&mut self) -> Vec<ErrorEntry> {
        self.warnings.take()
    }
}
