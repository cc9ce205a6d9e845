/*!
 * String Array Marshalling
 * Native string collections to managed `String[]` and back
 */

use crate::core::{NativeResult, ObjectRef};
use crate::runtime::ManagedEnv;

/// Copy an ordered collection of strings into a new managed string array
///
/// The array is sized exactly to `strings.len()`. Slot `i` receives a fresh
/// managed copy of `strings[i]`.
pub fn to_string_array<S: AsRef<str>>(env: &dyn ManagedEnv, strings: &[S]) -> NativeResult<ObjectRef> {
    let array = env.new_string_array(strings.len());
    for (index, s) in strings.iter().enumerate() {
        let element = env.new_string(s.as_ref());
        env.set_array_element(array, index, Some(element))?;
    }
    Ok(array)
}

/// Decode a managed string array; null slots come back as `None`
pub fn read_string_array(env: &dyn ManagedEnv, array: ObjectRef) -> NativeResult<Vec<Option<String>>> {
    let len = env.array_length(array)?;
    (0..len)
        .map(|index| match env.array_element(array, index)? {
            Some(element) => Ok(Some(env.string_chars(Some(element))?)),
            None => Ok(None),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::Heap;

    #[test]
    fn test_preserves_order_and_length() {
        let heap = Heap::new();
        let array = to_string_array(&heap, &["os.arch=x86_64", "", "user.dir=/"]).unwrap();
        assert_eq!(heap.array_length(array).unwrap(), 3);
        assert_eq!(
            read_string_array(&heap, array).unwrap(),
            vec![
                Some("os.arch=x86_64".to_string()),
                Some(String::new()),
                Some("user.dir=/".to_string())
            ]
        );
    }

    #[test]
    fn test_empty_input() {
        let heap = Heap::new();
        let empty: [&str; 0] = [];
        let array = to_string_array(&heap, &empty).unwrap();
        assert_eq!(heap.array_length(array).unwrap(), 0);
    }

    #[test]
    fn test_elements_are_independent_copies() {
        let heap = Heap::new();
        let array = to_string_array(&heap, &["dup", "dup"]).unwrap();
        let a = heap.array_element(array, 0).unwrap();
        let b = heap.array_element(array, 1).unwrap();
        assert_ne!(a, b);
    }
}
