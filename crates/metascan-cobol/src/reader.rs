//! Copybook reader: drives declaration scanning over one copybook file or
//! a PDS directory of copybooks and assembles data objects.
//!
//! The reader follows the shared worker life cycle: `init` validates the
//! parameters and fails fast before any file is opened, each `read` yields
//! the next data object, and end of data is signalled by `Ok(None)`.
//!
//! Three rule categories drive the mapping:
//! - `namespace` rules shape the object namespace from the prefix
//! - `data-type` rules map raw scanned types to target type strings
//! - `common-type` rules map raw scanned types to common type strings

use std::collections::HashMap;
use std::fs::{self, File};
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

use tracing::{error, trace};

use metascan_core::rule::engine;
use metascan_core::{
    Attribute, AttributeCode, CaseMode, DataObject, DataObjectReader, ImportError, ImportParams,
    Result, RuleStore, StatusLog, TypeMetaData,
};

use crate::metadata::FieldMetadata;
use crate::source::DeclarationReader;

/// Property names published in type mode, in publication order.
const TYPE_PROPERTIES: [&str; 6] = ["attribute", "declaration", "type", "size", "scale", "usage"];

/// Scanning scope of a copybook reader.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopybookScope {
    /// A single copybook file.
    Copybook,
    /// A directory whose files are each treated as a copybook, named after
    /// the mainframe partitioned data set.
    Pds,
}

impl FromStr for CopybookScope {
    type Err = ImportError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_uppercase().as_str() {
            "COPYBOOK" => Ok(CopybookScope::Copybook),
            "PDS" => Ok(CopybookScope::Pds),
            _ => Err(ImportError::ParameterInvalid("scope".into())),
        }
    }
}

/// Reads data object metadata from COBOL copybooks.
///
/// Parameters consumed at `init`:
///
/// | name                 | required             | meaning                          |
/// |----------------------|----------------------|----------------------------------|
/// | `scope`              | yes                  | `copybook` or `pds`              |
/// | `copybookFile`       | iff scope = copybook | the copybook to scan             |
/// | `copybookDirectory`  | iff scope = pds      | directory of copybooks           |
/// | `namespacePrefix`    | yes, non-blank       | input to the namespace rule      |
/// | `ruleStore`          | yes                  | shared handle, see `ImportParams`|
/// | `ruleGroup`          | no                   | informational label              |
/// | `case`               | no, default `mixed`  | folding for textual output       |
///
/// The reader is single threaded and pull based; one instance must not be
/// shared across threads.
#[derive(Debug)]
pub struct CopybookReader {
    /// Optional display name for logs and console messages.
    name: Option<String>,
    status: StatusLog,
    case_mode: CaseMode,
    scope: Option<CopybookScope>,
    /// The copybook being scanned: the configured file in COPYBOOK scope,
    /// the current member in PDS scope.
    copybook_file: Option<PathBuf>,
    copybook_directory: Option<PathBuf>,
    /// PDS members, sorted by file name for deterministic output.
    members: Vec<PathBuf>,
    member_idx: usize,
    rule_store: Option<Arc<RuleStore>>,
    rule_group: Option<String>,
    namespace_prefix: String,
    configured: bool,
    /// Set once the single copybook of COPYBOOK scope has been scanned.
    processed: bool,
    type_mode: bool,
    type_metadata: TypeMetaData,
}

impl CopybookReader {
    /// Create a reader whose status lines are discarded.
    pub fn new() -> Self {
        Self {
            name: None,
            status: StatusLog::sink(),
            case_mode: CaseMode::Mixed,
            scope: None,
            copybook_file: None,
            copybook_directory: None,
            members: Vec::new(),
            member_idx: 0,
            rule_store: None,
            rule_group: None,
            namespace_prefix: String::new(),
            configured: false,
            processed: false,
            type_mode: false,
            type_metadata: TypeMetaData::new(),
        }
    }

    /// Route status lines to the given sink.
    pub fn set_status_log(&mut self, status: StatusLog) {
        self.status = status;
    }

    /// The reader's display name.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Set the reader's display name.
    pub fn set_name(&mut self, name: &str) {
        self.name = Some(name.to_string());
    }

    /// Switch the reader to raw type collection for rule authoring. Call
    /// before the first `read`; only valid for COPYBOOK scope, which
    /// `init` enforces.
    pub fn enable_type_mode(&mut self) {
        self.type_mode = true;
        if self.type_metadata.properties().is_empty() {
            for property in TYPE_PROPERTIES {
                self.type_metadata.add_property(property);
            }
        }
    }

    /// True when the reader collects raw type data instead of resolving
    /// rules.
    pub fn is_type_mode(&self) -> bool {
        self.type_mode
    }

    /// The configured case mode.
    pub fn case_mode(&self) -> CaseMode {
        self.case_mode
    }

    /// The configured scope, once initialized.
    pub fn scope(&self) -> Option<CopybookScope> {
        self.scope
    }

    /// The copybook file: the configured file in COPYBOOK scope, the
    /// member being scanned in PDS scope.
    pub fn copybook_file(&self) -> Option<&Path> {
        self.copybook_file.as_deref()
    }

    /// The configured PDS directory, applicable to PDS scope only.
    pub fn copybook_directory(&self) -> Option<&Path> {
        self.copybook_directory.as_deref()
    }

    /// The configured namespace prefix.
    pub fn namespace_prefix(&self) -> &str {
        &self.namespace_prefix
    }

    /// The informational rule group label, if one was supplied.
    pub fn rule_group(&self) -> Option<&str> {
        self.rule_group.as_deref()
    }

    /// The shared rule store, once initialized.
    pub fn rule_store(&self) -> Option<&Arc<RuleStore>> {
        self.rule_store.as_ref()
    }

    /// Append a status line; suppressed in type mode.
    fn append_status(&mut self, line: &str) -> Result<()> {
        if self.type_mode {
            return Ok(());
        }
        self.status.append(line)
    }

    /// Record the failure on the status sink, then hand the error back.
    /// The status write is best effort so it never masks the failure.
    fn init_failure(&mut self, err: ImportError) -> ImportError {
        let _ = self.append_status(&err.to_string());
        err
    }

    fn extract_scope(&mut self, params: &ImportParams) -> Result<()> {
        let raw = match params.get("scope") {
            Some(raw) => raw,
            None => return Err(self.init_failure(ImportError::ParameterMissing("scope".into()))),
        };
        let scope = match raw.parse::<CopybookScope>() {
            Ok(scope) => scope,
            Err(err) => return Err(self.init_failure(err)),
        };
        self.scope = Some(scope);

        match scope {
            CopybookScope::Pds => self.configure_for_pds(params)?,
            CopybookScope::Copybook => self.configure_for_copybook(params)?,
        }

        // Type mode is restricted to a single copybook.
        if self.type_mode && scope != CopybookScope::Copybook {
            return Err(self.init_failure(ImportError::TypeModeInvalid));
        }
        Ok(())
    }

    fn configure_for_copybook(&mut self, params: &ImportParams) -> Result<()> {
        let file = match params.get("copybookFile") {
            Some(file) => file,
            None => {
                return Err(
                    self.init_failure(ImportError::ParameterMissing("copybookFile".into()))
                )
            }
        };
        let path = PathBuf::from(file);
        if !path.exists() {
            return Err(self.init_failure(ImportError::Source(format!(
                "copybook {} does not exist",
                path.display()
            ))));
        }
        if !path.is_file() {
            return Err(self.init_failure(ImportError::Source(format!(
                "copybook {} does not denote a file",
                path.display()
            ))));
        }
        self.copybook_file = Some(path);
        Ok(())
    }

    fn configure_for_pds(&mut self, params: &ImportParams) -> Result<()> {
        let dir = match params.get("copybookDirectory") {
            Some(dir) => dir,
            None => {
                return Err(
                    self.init_failure(ImportError::ParameterMissing("copybookDirectory".into()))
                )
            }
        };
        let path = PathBuf::from(dir);
        if !path.exists() {
            return Err(self.init_failure(ImportError::Source(format!(
                "directory {} does not exist",
                path.display()
            ))));
        }
        if !path.is_dir() {
            return Err(self.init_failure(ImportError::Source(format!(
                "directory {} does not denote a directory",
                path.display()
            ))));
        }

        let entries = fs::read_dir(&path).map_err(|e| ImportError::Io {
            context: format!("failed to list directory {}", path.display()),
            source: e,
        })?;
        let mut members: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| p.is_file())
            .collect();
        // The file system promises no listing order; sort so output order
        // is stable across platforms.
        members.sort();
        self.members = members;
        self.member_idx = 0;
        self.copybook_directory = Some(path);
        Ok(())
    }

    fn extract_namespace_prefix(&mut self, params: &ImportParams) -> Result<()> {
        let prefix = match params.get("namespacePrefix") {
            Some(prefix) => prefix.trim(),
            None => {
                return Err(
                    self.init_failure(ImportError::ParameterMissing("namespacePrefix".into()))
                )
            }
        };
        if prefix.is_empty() {
            return Err(self.init_failure(ImportError::ParameterEmpty("namespacePrefix".into())));
        }
        self.namespace_prefix = prefix.to_string();
        Ok(())
    }

    fn extract_rules(&mut self, params: &ImportParams) -> Result<()> {
        // The rule group is informational only.
        self.rule_group = params.get("ruleGroup").map(str::to_string);

        match params.rule_store() {
            Some(store) => self.rule_store = Some(store),
            None => {
                return Err(self.init_failure(ImportError::ParameterMissing("ruleStore".into())))
            }
        }
        Ok(())
    }

    fn extract_case_mode(&mut self, params: &ImportParams) -> Result<()> {
        if let Some(mode) = params.get("case") {
            match mode.parse::<CaseMode>() {
                Ok(mode) => self.case_mode = mode,
                Err(err) => return Err(self.init_failure(err)),
            }
        }
        Ok(())
    }

    /// Scan the current copybook into a data object.
    fn process_copybook(&mut self) -> Result<DataObject> {
        let data_object = self.create_data_object()?;
        self.processed = true;
        Ok(data_object)
    }

    fn create_data_object(&mut self) -> Result<DataObject> {
        let store = self
            .rule_store
            .clone()
            .ok_or_else(|| ImportError::NotConfigured("CopybookReader".into()))?;

        // Namespace: the namespace rule applied to the prefix, or the
        // prefix alone. Namespace rules see no arithmetic pass.
        let namespace = match store.rule("namespace", "name") {
            Some(rule) => rule.replace("%prefix%", &self.namespace_prefix),
            None => self.namespace_prefix.clone(),
        };

        let path = self
            .copybook_file
            .clone()
            .ok_or_else(|| ImportError::NotConfigured("CopybookReader".into()))?;
        let object_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        self.append_status("-------------------------------------------")?;
        self.append_status(&format!("Importing {object_name} ..."))?;
        self.append_status("-------------------------------------------")?;
        trace!(copybook = %object_name, "importing copybook");

        let file = match File::open(&path) {
            Ok(file) => file,
            Err(e) => {
                error!(copybook = %path.display(), error = %e, "failed to open copybook");
                let err = ImportError::Io {
                    context: format!("failed to open copybook {}", path.display()),
                    source: e,
                };
                let _ = self.append_status(&err.to_string());
                return Err(err);
            }
        };

        let mut declarations = DeclarationReader::new(BufReader::new(file));
        let attributes = match self.create_attributes(&mut declarations, &store) {
            Ok(attributes) => attributes,
            Err(e) => {
                // Release the file handle before the error travels up.
                drop(declarations);
                let _ = self.append_status(&e.to_string());
                return Err(e);
            }
        };

        Ok(DataObject {
            namespace: self.case_mode.convert(&namespace),
            name: self.case_mode.convert(&object_name),
            attributes,
        })
    }

    /// Scan every declaration of the current copybook into attributes.
    fn create_attributes(
        &mut self,
        declarations: &mut DeclarationReader<BufReader<File>>,
        store: &RuleStore,
    ) -> Result<Vec<Attribute>> {
        let mut attributes: Vec<Attribute> = Vec::new();

        while let Some(declaration) = declarations.next_declaration()? {
            if declaration.is_empty() {
                continue;
            }

            let field = FieldMetadata::parse(&declaration)?;
            trace!(field = %field, "scanned declaration");

            if field.is_condition_name() && !field.value.is_empty() && !field.data_name.is_empty()
            {
                // Attach the condition value to the field declared above
                // it. A copybook starting with a condition name is
                // malformed and reported as such.
                let attribute = attributes.last_mut().ok_or_else(|| {
                    ImportError::OrphanConditionName(field.data_name.clone())
                })?;
                attribute.add_code(AttributeCode::new(field.value, field.data_name));
                continue;
            }

            if !field.is_attribute() {
                continue;
            }

            let seq_no = attributes.len() as u32 + 1;
            let attribute = self.create_attribute(&field, seq_no, store)?;
            attributes.push(attribute);
        }
        Ok(attributes)
    }

    /// Build one attribute, resolving its types through the rule store. In
    /// type mode a placeholder attribute is returned instead, keeping
    /// condition-name roll-up well formed.
    fn create_attribute(
        &mut self,
        field: &FieldMetadata,
        seq_no: u32,
        store: &RuleStore,
    ) -> Result<Attribute> {
        if self.type_mode {
            self.add_type_data(field);
            return Ok(Attribute::default());
        }

        let size = field.size.to_string();
        let scale = field.decimal_digits.to_string();

        let data_type = match store.rule("data-type", &field.type_string) {
            Some(rule) => {
                let rule = rule
                    .replace("%type%", &field.type_string)
                    .replace("%size%", &size)
                    .replace("%scale%", &scale)
                    .replace("%usage%", &field.usage);
                engine::process_rule(&rule)?
            }
            None => field.declared_type.clone(),
        };

        let common_type = match store.rule("common-type", &field.type_string) {
            Some(rule) => {
                let rule = rule
                    .replace("%type%", &field.type_string)
                    .replace("%size%", &size)
                    .replace("%scale%", &scale)
                    .replace("%usage%", &field.usage);
                engine::process_rule(&rule)?
            }
            None => String::new(),
        };

        Ok(Attribute {
            name: self.case_mode.convert(&field.data_name),
            seq_no,
            data_type: self.case_mode.convert(&data_type),
            common_type: self.case_mode.convert(&common_type),
            default_value: self.case_mode.convert(&field.value),
            codes: Vec::new(),
        })
    }

    /// Record the raw classification of one field for rule authoring.
    fn add_type_data(&mut self, field: &FieldMetadata) {
        let mut entry = HashMap::new();
        entry.insert("attribute".to_string(), field.data_name.clone());
        entry.insert("declaration".to_string(), field.declared_type.clone());
        entry.insert("type".to_string(), field.type_string.clone());
        entry.insert("size".to_string(), field.size.to_string());
        entry.insert("scale".to_string(), field.decimal_digits.to_string());
        entry.insert("usage".to_string(), field.usage.clone());
        self.type_metadata.add(entry);
    }
}

impl Default for CopybookReader {
    fn default() -> Self {
        Self::new()
    }
}

impl DataObjectReader for CopybookReader {
    fn init(&mut self, params: &ImportParams) -> Result<()> {
        self.extract_scope(params)?;
        self.extract_namespace_prefix(params)?;
        self.extract_rules(params)?;
        self.extract_case_mode(params)?;
        self.configured = true;
        Ok(())
    }

    fn read(&mut self) -> Result<Option<DataObject>> {
        if !self.configured {
            return Err(ImportError::NotConfigured("CopybookReader".into()));
        }
        match self.scope {
            Some(CopybookScope::Pds) => {
                if self.member_idx == self.members.len() {
                    return Ok(None);
                }
                self.copybook_file = Some(self.members[self.member_idx].clone());
                self.member_idx += 1;
                self.process_copybook().map(Some)
            }
            Some(CopybookScope::Copybook) => {
                if self.processed {
                    return Ok(None);
                }
                self.process_copybook().map(Some)
            }
            None => Err(ImportError::NotConfigured("CopybookReader".into())),
        }
    }

    fn close(&mut self) {
        // File handles are scoped to each copybook scan and are already
        // released when a scan ends, normally or on error.
    }

    fn type_metadata(&self) -> Result<&TypeMetaData> {
        if !self.type_mode {
            return Err(ImportError::TypeMetaDataUnsupported);
        }
        Ok(&self.type_metadata)
    }
}
