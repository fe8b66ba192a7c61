use serde_json::Value;

use crate::coerce::Object;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaVariant {
    ScannerNative,
    Canonical,
    Unrecognized,
}

const NATIVE_ARRAYS: &[&str] = &["allFiles", "fileTimeline", "suspiciousFiles"];

impl SchemaVariant {
    /// First match wins: scanner-native, then canonical, then neither.
    pub fn detect(root: &Object) -> Self {
        if is_scanner_native(root) {
            SchemaVariant::ScannerNative
        } else if is_canonical(root) {
            SchemaVariant::Canonical
        } else {
            SchemaVariant::Unrecognized
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SchemaVariant::ScannerNative => "scanner-native",
            SchemaVariant::Canonical => "canonical",
            SchemaVariant::Unrecognized => "unrecognized",
        }
    }
}

fn is_scanner_native(root: &Object) -> bool {
    if root.get("scanInfo").is_some_and(Value::is_object) {
        return true;
    }
    if root.get("fileTimeline").is_some_and(Value::is_object) {
        return true;
    }
    NATIVE_ARRAYS
        .iter()
        .any(|k| root.get(*k).is_some_and(Value::is_array))
}

fn is_canonical(root: &Object) -> bool {
    let present = |k: &str| root.get(k).is_some_and(|v| !v.is_null());
    let is_object = |k: &str| root.get(k).is_some_and(Value::is_object);
    let is_array = |k: &str| root.get(k).is_some_and(Value::is_array);

    present("caseId")
        && is_object("summary")
        && is_object("statistics")
        && is_array("files")
        && is_array("timeline")
        && is_array("suspiciousFindings")
}
