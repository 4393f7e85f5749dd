//! Sidebar configuration: named, ordered navigation trees.
//!
//! Sidebars are authored in YAML, one top-level key per sidebar:
//!
//! ```yaml
//! tutorialSidebar:
//!   - intro
//!   - type: category
//!     label: Getting Started
//!     items:
//!       - getting-started/installation
//!       - getting-started/configuration
//!   - type: link
//!     label: GitHub
//!     href: https://github.com/acme/site
//! ```
//!
//! A bare string is a document reference. Referenced documents are not
//! checked for existence here; the site generator resolves them against its
//! content index.

use std::collections::HashSet;
use std::fmt;
use std::path::Path;

use serde::de::{self, IgnoredAny, MapAccess, SeqAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_yaml::{Mapping, Value};

use crate::error::{ConfigError, FieldPath, SchemaError};
use crate::validate::{Choice, lookup_choice, require_http_url, require_non_empty};

/// Sidebar a docs plugin gets when it does not name a sidebar file.
pub const DEFAULT_SIDEBAR_ID: &str = "defaultSidebar";

/// All sidebars declared in one sidebar file, in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SidebarConfig {
    sidebars: Vec<Sidebar>,
}

/// A named navigation tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Sidebar {
    pub id: String,
    pub items: Vec<SidebarNode>,
}

/// Entry of a navigation tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SidebarNode {
    /// Reference to a single document.
    Doc {
        id: String,
        /// Label override; the document title is used otherwise.
        #[serde(skip_serializing_if = "Option::is_none")]
        label: Option<String>,
    },
    /// Labeled group of nodes.
    Category {
        label: String,
        items: Vec<SidebarNode>,
        collapsible: bool,
        collapsed: bool,
        #[serde(skip_serializing_if = "Option::is_none")]
        link: Option<CategoryLink>,
    },
    /// External link.
    Link { label: String, href: String },
    /// Placeholder the site generator fills from a content directory.
    Autogenerated {
        #[serde(rename = "dirName")]
        dir_name: String,
    },
}

impl SidebarNode {
    /// Document leaf without a label override.
    pub fn doc(id: impl Into<String>) -> Self {
        Self::Doc {
            id: id.into(),
            label: None,
        }
    }

    /// Collapsible category, initially collapsed, without a landing page.
    pub fn category(label: impl Into<String>, items: Vec<SidebarNode>) -> Self {
        Self::Category {
            label: label.into(),
            items,
            collapsible: true,
            collapsed: true,
            link: None,
        }
    }
}

/// Landing page of a category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum CategoryLink {
    /// Existing document.
    Doc { id: String },
    /// Index page listing the category's children.
    GeneratedIndex {
        #[serde(skip_serializing_if = "Option::is_none")]
        slug: Option<String>,
    },
}

impl Sidebar {
    /// Document ids in authored order, including category landing documents.
    #[must_use]
    pub fn documents(&self) -> Vec<&str> {
        let mut docs = Vec::new();
        collect_documents(&self.items, &mut docs);
        docs
    }
}

fn collect_documents<'a>(nodes: &'a [SidebarNode], docs: &mut Vec<&'a str>) {
    for node in nodes {
        match node {
            SidebarNode::Doc { id, .. } => docs.push(id),
            SidebarNode::Category { items, link, .. } => {
                if let Some(CategoryLink::Doc { id }) = link {
                    docs.push(id);
                }
                collect_documents(items, docs);
            }
            SidebarNode::Link { .. } | SidebarNode::Autogenerated { .. } => {}
        }
    }
}

impl SidebarConfig {
    /// Build from already-typed declarations.
    ///
    /// Checks that identifiers are unique, categories are non-empty and
    /// document ids are well formed.
    pub fn from_declarations(
        declarations: Vec<(String, Vec<SidebarNode>)>,
    ) -> Result<Self, SchemaError> {
        let mut seen = HashSet::new();
        let mut sidebars = Vec::with_capacity(declarations.len());

        for (id, items) in declarations {
            let path = FieldPath::root().field(&id);
            require_non_empty(&id, &path)?;
            if id.chars().any(char::is_whitespace) {
                return Err(SchemaError::new(
                    path,
                    "sidebar id cannot contain whitespace",
                ));
            }
            if !seen.insert(id.clone()) {
                return Err(SchemaError::new(path, "sidebar is declared more than once"));
            }

            validate_nodes(&items, &path)?;
            let sidebar = Sidebar { id, items };
            warn_on_repeated_documents(&sidebar);
            sidebars.push(sidebar);
        }

        Ok(Self { sidebars })
    }

    /// Parse and validate a YAML sidebar file's contents.
    pub fn from_yaml_str(content: &str) -> Result<Self, ConfigError> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        let raw = match serde_yaml::from_str(content)? {
            Declarations::Entries(entries) => entries,
            Declarations::NotMapping(found) => {
                return Err(SchemaError::new(
                    FieldPath::root(),
                    format!("expected a mapping of sidebar ids to item lists, found {found}"),
                )
                .into());
            }
        };
        let declarations = raw
            .into_iter()
            .map(|(id, value)| {
                let items = parse_sidebar(&value, &FieldPath::root().field(&id))?;
                Ok::<_, SchemaError>((id, items))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self::from_declarations(declarations)?)
    }

    /// Load and validate a YAML sidebar file.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_yaml_str(&content)?;
        tracing::debug!(
            path = %path.display(),
            sidebars = config.len(),
            "Loaded sidebar config"
        );
        Ok(config)
    }

    /// The single autogenerated sidebar covering a whole docs directory.
    #[must_use]
    pub fn autogenerated() -> Self {
        Self {
            sidebars: vec![Sidebar {
                id: DEFAULT_SIDEBAR_ID.to_owned(),
                items: vec![SidebarNode::Autogenerated {
                    dir_name: ".".to_owned(),
                }],
            }],
        }
    }

    /// Look up a sidebar by identifier.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Sidebar> {
        self.sidebars.iter().find(|sidebar| sidebar.id == id)
    }

    /// Whether a sidebar with this identifier is declared.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Document ids referenced by a sidebar, in authored order.
    #[must_use]
    pub fn documents(&self, id: &str) -> Option<Vec<&str>> {
        self.get(id).map(Sidebar::documents)
    }

    /// Sidebar identifiers in declaration order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.sidebars.iter().map(|sidebar| sidebar.id.as_str())
    }

    /// Sidebars in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &Sidebar> {
        self.sidebars.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.sidebars.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sidebars.is_empty()
    }
}

impl Serialize for SidebarConfig {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.sidebars.len()))?;
        for sidebar in &self.sidebars {
            map.serialize_entry(&sidebar.id, &sidebar.items)?;
        }
        map.end()
    }
}

/// Top level of a sidebar file.
enum Declarations {
    /// Sidebar entries in file order, repeated keys included.
    Entries(Vec<(String, Value)>),
    /// Anything other than a mapping, described for the error message.
    NotMapping(&'static str),
}

impl<'de> Deserialize<'de> for Declarations {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct DeclarationsVisitor;

        impl<'de> Visitor<'de> for DeclarationsVisitor {
            type Value = Declarations;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a mapping of sidebar ids to item lists")
            }

            fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
                Ok(Declarations::Entries(Vec::new()))
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
                let mut entries = Vec::new();
                while let Some(entry) = map.next_entry::<String, Value>()? {
                    entries.push(entry);
                }
                Ok(Declarations::Entries(entries))
            }

            fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
                while seq.next_element::<IgnoredAny>()?.is_some() {}
                Ok(Declarations::NotMapping("a list"))
            }

            fn visit_str<E: de::Error>(self, _value: &str) -> Result<Self::Value, E> {
                Ok(Declarations::NotMapping("a string"))
            }

            fn visit_bool<E: de::Error>(self, _value: bool) -> Result<Self::Value, E> {
                Ok(Declarations::NotMapping("a boolean"))
            }

            fn visit_i64<E: de::Error>(self, _value: i64) -> Result<Self::Value, E> {
                Ok(Declarations::NotMapping("a number"))
            }

            fn visit_u64<E: de::Error>(self, _value: u64) -> Result<Self::Value, E> {
                Ok(Declarations::NotMapping("a number"))
            }

            fn visit_f64<E: de::Error>(self, _value: f64) -> Result<Self::Value, E> {
                Ok(Declarations::NotMapping("a number"))
            }
        }

        deserializer.deserialize_any(DeclarationsVisitor)
    }
}

/// Explicit `type` of a sidebar node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NodeKind {
    Doc,
    Category,
    Link,
    Autogenerated,
}

impl Choice for NodeKind {
    const VARIANTS: &'static [(&'static str, Self)] = &[
        ("doc", Self::Doc),
        ("category", Self::Category),
        ("link", Self::Link),
        ("autogenerated", Self::Autogenerated),
    ];
}

impl NodeKind {
    fn keys(self) -> &'static [&'static str] {
        match self {
            Self::Doc => &["type", "id", "label"],
            Self::Category => &["type", "label", "items", "collapsible", "collapsed", "link"],
            Self::Link => &["type", "label", "href"],
            Self::Autogenerated => &["type", "dirName"],
        }
    }
}

fn parse_sidebar(value: &Value, path: &FieldPath) -> Result<Vec<SidebarNode>, SchemaError> {
    match value {
        Value::Sequence(items) => parse_items(items, path),
        Value::Null => Ok(Vec::new()),
        _ => Err(SchemaError::new(
            path.clone(),
            "expected a list of sidebar items",
        )),
    }
}

fn parse_items(items: &[Value], path: &FieldPath) -> Result<Vec<SidebarNode>, SchemaError> {
    items
        .iter()
        .enumerate()
        .map(|(i, item)| parse_node(item, &path.index(i)))
        .collect()
}

fn parse_node(value: &Value, path: &FieldPath) -> Result<SidebarNode, SchemaError> {
    let map = match value {
        Value::String(id) => return Ok(SidebarNode::doc(id.clone())),
        Value::Mapping(map) => map,
        _ => {
            return Err(SchemaError::new(
                path.clone(),
                "expected a document id or a mapping with a `type`",
            ));
        }
    };

    let type_path = path.field("type");
    let kind_name = get_str(map, "type", path)?.ok_or_else(|| SchemaError::missing(&type_path))?;
    let kind: NodeKind = lookup_choice(kind_name, &type_path)?;
    warn_unknown_keys(map, kind.keys(), path);

    let node = match kind {
        NodeKind::Doc => SidebarNode::Doc {
            id: require_str(map, "id", path)?.to_owned(),
            label: get_str(map, "label", path)?.map(str::to_owned),
        },
        NodeKind::Category => {
            let items_path = path.field("items");
            let items = match map.get("items") {
                Some(Value::Sequence(items)) => parse_items(items, &items_path)?,
                Some(Value::Null) => Vec::new(),
                Some(_) => return Err(SchemaError::new(items_path, "expected a list")),
                None => return Err(SchemaError::missing(&items_path)),
            };
            let link = map
                .get("link")
                .map(|link| parse_category_link(link, &path.field("link")))
                .transpose()?;
            SidebarNode::Category {
                label: require_str(map, "label", path)?.to_owned(),
                items,
                collapsible: get_bool(map, "collapsible", path)?.unwrap_or(true),
                collapsed: get_bool(map, "collapsed", path)?.unwrap_or(true),
                link,
            }
        }
        NodeKind::Link => SidebarNode::Link {
            label: require_str(map, "label", path)?.to_owned(),
            href: require_str(map, "href", path)?.to_owned(),
        },
        NodeKind::Autogenerated => SidebarNode::Autogenerated {
            dir_name: require_str(map, "dirName", path)?.to_owned(),
        },
    };
    Ok(node)
}

fn parse_category_link(value: &Value, path: &FieldPath) -> Result<CategoryLink, SchemaError> {
    let Value::Mapping(map) = value else {
        return Err(SchemaError::new(path.clone(), "expected a mapping"));
    };
    match require_str(map, "type", path)? {
        "doc" => {
            warn_unknown_keys(map, &["type", "id"], path);
            Ok(CategoryLink::Doc {
                id: require_str(map, "id", path)?.to_owned(),
            })
        }
        "generated-index" => {
            warn_unknown_keys(map, &["type", "slug"], path);
            Ok(CategoryLink::GeneratedIndex {
                slug: get_str(map, "slug", path)?.map(str::to_owned),
            })
        }
        other => Err(SchemaError::new(
            path.field("type"),
            format!("must be one of doc, generated-index (got \"{other}\")"),
        )),
    }
}

/// Optional string value of `key`.
fn get_str<'a>(
    map: &'a Mapping,
    key: &str,
    path: &FieldPath,
) -> Result<Option<&'a str>, SchemaError> {
    match map.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(value)) => Ok(Some(value.as_str())),
        Some(_) => Err(SchemaError::new(path.field(key), "expected a string")),
    }
}

/// Required string value of `key`.
fn require_str<'a>(map: &'a Mapping, key: &str, path: &FieldPath) -> Result<&'a str, SchemaError> {
    get_str(map, key, path)?.ok_or_else(|| SchemaError::missing(&path.field(key)))
}

/// Optional boolean value of `key`.
fn get_bool(map: &Mapping, key: &str, path: &FieldPath) -> Result<Option<bool>, SchemaError> {
    match map.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Bool(value)) => Ok(Some(*value)),
        Some(_) => Err(SchemaError::new(path.field(key), "expected true or false")),
    }
}

fn warn_unknown_keys(map: &Mapping, known: &[&str], path: &FieldPath) {
    for key in map.keys() {
        match key.as_str() {
            Some(key) if known.contains(&key) => {}
            Some(key) => tracing::warn!(path = %path, key, "Ignoring unknown sidebar key"),
            None => tracing::warn!(path = %path, "Ignoring non-string sidebar key"),
        }
    }
}

fn validate_nodes(nodes: &[SidebarNode], path: &FieldPath) -> Result<(), SchemaError> {
    for (i, node) in nodes.iter().enumerate() {
        validate_node(node, &path.index(i))?;
    }
    Ok(())
}

fn validate_node(node: &SidebarNode, path: &FieldPath) -> Result<(), SchemaError> {
    match node {
        SidebarNode::Doc { id, label } => {
            validate_doc_id(id, path)?;
            if let Some(label) = label {
                require_non_empty(label, &path.field("label"))?;
            }
        }
        SidebarNode::Category {
            label,
            items,
            collapsible,
            collapsed,
            link,
        } => {
            require_non_empty(label, &path.field("label"))?;
            if items.is_empty() {
                return Err(SchemaError::new(
                    path.clone(),
                    format!("category \"{label}\" has no items"),
                ));
            }
            if *collapsed && !*collapsible {
                return Err(SchemaError::new(
                    path.field("collapsed"),
                    "a category that is not collapsible cannot start collapsed",
                ));
            }
            match link {
                Some(CategoryLink::Doc { id }) => {
                    validate_doc_id(id, &path.field("link").field("id"))?;
                }
                Some(CategoryLink::GeneratedIndex { slug: Some(slug) })
                    if !slug.starts_with('/') =>
                {
                    return Err(SchemaError::new(
                        path.field("link").field("slug"),
                        "slug must start with /",
                    ));
                }
                Some(CategoryLink::GeneratedIndex { .. }) | None => {}
            }
            validate_nodes(items, &path.field("items"))?;
        }
        SidebarNode::Link { label, href } => {
            require_non_empty(label, &path.field("label"))?;
            require_http_url(href, &path.field("href"))?;
        }
        SidebarNode::Autogenerated { dir_name } => {
            let dir_path = path.field("dirName");
            require_non_empty(dir_name, &dir_path)?;
            if dir_name.starts_with('/') {
                return Err(SchemaError::new(dir_path, "must be relative to the docs directory"));
            }
        }
    }
    Ok(())
}

/// Check the syntax of a document-path identifier such as
/// `user-guides/teachers`.
fn validate_doc_id(id: &str, path: &FieldPath) -> Result<(), SchemaError> {
    let reason = if id.is_empty() {
        "document id cannot be empty"
    } else if id.trim() != id {
        "document id cannot start or end with whitespace"
    } else if id.contains('\\') {
        "document id must use / as separator"
    } else if id.starts_with('/') || id.ends_with('/') {
        "document id cannot start or end with /"
    } else if id
        .split('/')
        .any(|segment| segment.is_empty() || segment == "." || segment == "..")
    {
        "document id contains an empty, . or .. segment"
    } else {
        return Ok(());
    };
    Err(SchemaError::new(path.clone(), format!("{reason} (got \"{id}\")")))
}

fn warn_on_repeated_documents(sidebar: &Sidebar) {
    let mut seen = HashSet::new();
    for doc in sidebar.documents() {
        if !seen.insert(doc) {
            tracing::warn!(
                sidebar = %sidebar.id,
                doc,
                "Document appears more than once in sidebar"
            );
        }
    }
}
