/*!
 * System Natives Tests
 * Environment lookups, host properties and forced field assignment
 */

use pretty_assertions::assert_eq;
use serial_test::serial;
use std::collections::HashSet;
use system_natives::natives::read_string_array;
use system_natives::runtime::SYSTEM_CLASS;
use system_natives::{
    BridgeConfig, EnvironmentTable, FieldAssignment, Heap, ManagedEnv, NativeError, SystemNatives,
};

fn decode(heap: &Heap, obj: system_natives::ObjectRef) -> String {
    heap.string_chars(Some(obj)).unwrap()
}

#[test]
#[serial]
fn test_get_env_by_name_present() {
    std::env::set_var("SYSTEM_NATIVES_TEST_PATH", "/usr/bin");
    let heap = Heap::new();
    let natives = SystemNatives::default();

    let name = heap.new_string("SYSTEM_NATIVES_TEST_PATH");
    let value = natives.get_env_by_name(&heap, Some(name)).unwrap();
    assert_eq!(value.map(|v| decode(&heap, v)), Some("/usr/bin".to_string()));

    std::env::remove_var("SYSTEM_NATIVES_TEST_PATH");
}

#[test]
#[serial]
fn test_get_env_by_name_absent_not_empty() {
    std::env::remove_var("DOES_NOT_EXIST_XYZ");
    let heap = Heap::new();
    let name = heap.new_string("DOES_NOT_EXIST_XYZ");
    let value = SystemNatives::default().get_env_by_name(&heap, Some(name)).unwrap();
    assert_eq!(value, None);
}

#[test]
#[serial]
fn test_get_env_by_name_empty_value() {
    std::env::set_var("SYSTEM_NATIVES_TEST_EMPTY", "");
    let heap = Heap::new();
    let name = heap.new_string("SYSTEM_NATIVES_TEST_EMPTY");
    let value = SystemNatives::default().get_env_by_name(&heap, Some(name)).unwrap();
    assert_eq!(value.map(|v| decode(&heap, v)), Some(String::new()));
    std::env::remove_var("SYSTEM_NATIVES_TEST_EMPTY");
}

#[test]
#[serial]
fn test_get_env_by_name_returns_fresh_copy() {
    std::env::set_var("SYSTEM_NATIVES_TEST_COPY", "before");
    let heap = Heap::new();
    let natives = SystemNatives::default();
    let name = heap.new_string("SYSTEM_NATIVES_TEST_COPY");

    let first = natives.get_env_by_name(&heap, Some(name)).unwrap().unwrap();
    std::env::set_var("SYSTEM_NATIVES_TEST_COPY", "after");
    let second = natives.get_env_by_name(&heap, Some(name)).unwrap().unwrap();

    assert_eq!(decode(&heap, first), "before");
    assert_eq!(decode(&heap, second), "after");
    std::env::remove_var("SYSTEM_NATIVES_TEST_COPY");
}

#[test]
#[serial]
fn test_get_env_by_index_matches_table() {
    std::env::set_var("SYSTEM_NATIVES_TEST_INDEX", "42");
    let heap = Heap::new();
    let natives = SystemNatives::default();
    let table = EnvironmentTable::capture();
    assert!(!table.is_empty());

    for (index, expected) in table.iter().enumerate() {
        let entry = natives.get_env_by_index(&heap, index as i32).unwrap();
        let entry = decode(&heap, entry);
        assert_eq!(entry, expected.to_string_lossy());
        assert!(entry.contains('='), "entry '{}' is not NAME=VALUE", entry);
    }

    let position = table.position("SYSTEM_NATIVES_TEST_INDEX").unwrap();
    let entry = natives.get_env_by_index(&heap, position as i32).unwrap();
    assert_eq!(decode(&heap, entry), "SYSTEM_NATIVES_TEST_INDEX=42");
    std::env::remove_var("SYSTEM_NATIVES_TEST_INDEX");
}

#[test]
#[serial]
fn test_get_env_by_index_past_end_is_range_error() {
    let heap = Heap::new();
    let natives = SystemNatives::default();
    let count = EnvironmentTable::capture().len();

    match natives.get_env_by_index(&heap, count as i32) {
        Err(NativeError::Range { index, len }) => {
            assert_eq!(index, count as i64);
            assert_eq!(len, count);
        }
        other => panic!("expected range error, got {:?}", other),
    }
    assert!(matches!(
        natives.get_env_by_index(&heap, -1),
        Err(NativeError::Range { index: -1, .. })
    ));
}

#[test]
#[serial]
fn test_special_properties_shape() {
    let heap = Heap::new();
    let array = SystemNatives::default().special_properties(&heap).unwrap();
    let entries: Vec<String> = read_string_array(&heap, array)
        .unwrap()
        .into_iter()
        .map(Option::unwrap)
        .collect();

    assert_eq!(entries.len(), 6);
    let keys: Vec<&str> = entries
        .iter()
        .map(|e| e.split_once('=').expect("key=value").0)
        .collect();
    assert_eq!(
        keys,
        vec![
            "os.arch",
            "os.name",
            "os.version",
            "user.dir",
            "android.zlib.version",
            "android.openssl.version"
        ]
    );
    assert_eq!(keys.iter().collect::<HashSet<_>>().len(), 6);
}

#[test]
#[serial]
fn test_special_properties_custom_prefix() {
    let heap = Heap::new();
    let natives = SystemNatives::new(BridgeConfig::default().with_property_prefix("acme"));
    let array = natives.special_properties(&heap).unwrap();
    let entries = read_string_array(&heap, array).unwrap();
    assert!(entries[4].as_deref().unwrap().starts_with("acme.zlib.version="));
    assert!(entries[5].as_deref().unwrap().starts_with("acme.openssl.version="));
}

#[cfg(all(target_os = "linux", target_arch = "x86_64"))]
#[test]
#[serial]
fn test_special_properties_linux_x86_64() {
    let heap = Heap::new();
    let array = SystemNatives::default().special_properties(&heap).unwrap();
    let entries = read_string_array(&heap, array).unwrap();
    assert_eq!(entries[0].as_deref(), Some("os.arch=x86_64"));
    assert_eq!(entries[1].as_deref(), Some("os.name=Linux"));
}

#[test]
#[serial]
fn test_special_properties_reports_working_directory() {
    let original = std::env::current_dir().unwrap();
    let dir = tempfile::tempdir().unwrap();
    std::env::set_current_dir(dir.path()).unwrap();
    let expected = std::env::current_dir().unwrap();

    let heap = Heap::new();
    let array = SystemNatives::default().special_properties(&heap);
    std::env::set_current_dir(&original).unwrap();

    let entries = read_string_array(&heap, array.unwrap()).unwrap();
    assert_eq!(
        entries[3].as_deref(),
        Some(format!("user.dir={}", expected.display()).as_str())
    );
}

#[test]
#[serial]
fn test_special_properties_removed_working_directory_is_os_error() {
    let original = std::env::current_dir().unwrap();
    let dir = tempfile::tempdir().unwrap();
    std::env::set_current_dir(dir.path()).unwrap();
    let removed = dir.close();

    let heap = Heap::new();
    let result = SystemNatives::default().special_properties(&heap);
    std::env::set_current_dir(&original).unwrap();

    removed.unwrap();
    assert!(matches!(
        result,
        Err(NativeError::OsQuery { ref query, errno: 2, .. }) if query.as_str() == "getcwd"
    ));
}

#[test]
fn test_set_field_round_trip_on_final_field() {
    let heap = Heap::with_system_class();
    let system = heap.find_class(SYSTEM_CLASS).unwrap();
    let stream_class = heap.find_class("java/io/PrintStream").unwrap();
    let stream = heap.new_instance(stream_class).unwrap();

    let name = heap.new_string("out");
    let signature = heap.new_string("Ljava/io/PrintStream;");
    let field = heap
        .static_field_id(system, "out", "Ljava/io/PrintStream;")
        .unwrap();

    // Managed writes to the final field are refused
    assert!(heap.put_static(system, field, Some(stream)).is_err());

    let outcome = SystemNatives::default()
        .set_field_impl(&heap, system, Some(name), Some(signature), Some(stream))
        .unwrap();
    assert_eq!(outcome, FieldAssignment::Assigned);
    assert_eq!(heap.get_static_object_field(system, field).unwrap(), Some(stream));
}

#[test]
fn test_set_field_null_value() {
    let heap = Heap::with_system_class();
    let system = heap.find_class(SYSTEM_CLASS).unwrap();
    let natives = SystemNatives::default();
    let name = heap.new_string("err");
    let signature = heap.new_string("Ljava/io/PrintStream;");
    let stream = heap
        .new_instance(heap.find_class("java/io/PrintStream").unwrap())
        .unwrap();

    natives
        .set_field_impl(&heap, system, Some(name), Some(signature), Some(stream))
        .unwrap();
    natives
        .set_field_impl(&heap, system, Some(name), Some(signature), None)
        .unwrap();

    let field = heap
        .static_field_id(system, "err", "Ljava/io/PrintStream;")
        .unwrap();
    assert_eq!(heap.get_static_object_field(system, field).unwrap(), None);
}

#[test]
fn test_set_field_resolution_failures_propagate() {
    let heap = Heap::with_system_class();
    let system = heap.find_class(SYSTEM_CLASS).unwrap();
    let natives = SystemNatives::default();

    let out = heap.new_string("out");
    let wrong_sig = heap.new_string("Ljava/lang/String;");
    assert!(matches!(
        natives.set_field_impl(&heap, system, Some(out), Some(wrong_sig), None),
        Err(NativeError::NoSuchField { .. })
    ));

    let missing = heap.new_string("missing");
    let sig = heap.new_string("Ljava/io/PrintStream;");
    assert!(matches!(
        natives.set_field_impl(&heap, system, Some(missing), Some(sig), None),
        Err(NativeError::NoSuchField { .. })
    ));

    let malformed = heap.new_string("Ljava/io/PrintStream");
    assert!(matches!(
        natives.set_field_impl(&heap, system, Some(out), Some(malformed), None),
        Err(NativeError::InvalidDescriptor(_))
    ));
}

#[test]
fn test_set_field_skips_on_malformed_signature_string() {
    let heap = Heap::with_system_class();
    let system = heap.find_class(SYSTEM_CLASS).unwrap();
    let name = heap.new_string("out");
    let signature = heap.new_string_utf16(&[0x004C, 0xD83E]);
    let outcome = SystemNatives::default()
        .set_field_impl(&heap, system, Some(name), Some(signature), None)
        .unwrap();
    assert_eq!(outcome, FieldAssignment::Skipped);
}
