use std::borrow::Borrow;
use std::fmt::{self, Display, Formatter};
use std::marker::PhantomData;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::core::convert::{Construct, ConversionHook, Domain};
use crate::core::slice::{exact_positions, Slice};
use crate::utils::error::Result;

/// Insertion-ordered mapping whose slices select entries by value.
///
/// Entries live in a `Vec`, so key lookups and `insert` scan linearly and
/// building a dict of `n` entries costs O(n²) key comparisons.
///
/// ```
/// use tslist::TsDict;
///
/// let dict: TsDict<&str, f64> = [("a", 1.0), ("b", 2.0), ("c", 3.0)].into_iter().collect();
/// let picked = dict.select(1.5..3.0).unwrap();
/// assert_eq!(picked.len(), 1);
/// assert_eq!(picked.get("b"), Some(&2.0));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TsDict<K, V> {
    entries: Vec<(K, V)>,
}

impl<K, V> TsDict<K, V> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entry at insertion position `index`.
    pub fn get_index(&self, index: usize) -> Option<(&K, &V)> {
        self.entries.get(index).map(|(k, v)| (k, v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.entries.iter().map(|(k, _)| k)
    }

    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.entries.iter().map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        self.entries.iter().map(|(k, v)| (k, v))
    }
}

impl<K: PartialEq, V> TsDict<K, V> {
    /// Inserts or replaces; a replaced entry keeps its position.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        match self.position(&key) {
            Some(index) => Some(std::mem::replace(&mut self.entries[index].1, value)),
            None => {
                self.entries.push((key, value));
                None
            }
        }
    }

    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: PartialEq + ?Sized,
    {
        self.position(key).map(|index| &self.entries[index].1)
    }

    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: PartialEq + ?Sized,
    {
        self.position(key).map(|index| &mut self.entries[index].1)
    }

    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: PartialEq + ?Sized,
    {
        self.position(key).is_some()
    }

    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: PartialEq + ?Sized,
    {
        self.position(key).map(|index| self.entries.remove(index).1)
    }

    fn position<Q>(&self, key: &Q) -> Option<usize>
    where
        K: Borrow<Q>,
        Q: PartialEq + ?Sized,
    {
        self.entries.iter().position(|(k, _)| k.borrow() == key)
    }
}

impl<K: Clone, V: Clone> TsDict<K, V> {
    /// Entries whose value in the domain `D` lies in `slice`.
    pub fn select<D, S>(&self, slice: S) -> Result<Self>
    where
        S: Into<Slice<D>>,
        D: Domain + Construct<V>,
        V: ConversionHook<D>,
    {
        let positions = slice.into().matching_positions(self.values())?;
        Ok(self.pick(&positions))
    }

    /// Entries whose value in the domain of `value` equals it.
    pub fn at<D>(&self, value: &D) -> Result<Self>
    where
        D: Domain + Construct<V>,
        V: ConversionHook<D>,
    {
        let positions = exact_positions(self.values(), value)?;
        Ok(self.pick(&positions))
    }

    /// Entries whose key in the domain `D` lies in `slice`.
    pub fn select_keys<D, S>(&self, slice: S) -> Result<Self>
    where
        S: Into<Slice<D>>,
        D: Domain + Construct<K>,
        K: ConversionHook<D>,
    {
        let positions = slice.into().matching_positions(self.keys())?;
        Ok(self.pick(&positions))
    }

    /// Entries whose key in the domain of `value` equals it.
    pub fn at_key<D>(&self, value: &D) -> Result<Self>
    where
        D: Domain + Construct<K>,
        K: ConversionHook<D>,
    {
        let positions = exact_positions(self.keys(), value)?;
        Ok(self.pick(&positions))
    }

    fn pick(&self, positions: &[usize]) -> Self {
        Self {
            entries: positions
                .iter()
                .filter_map(|&position| self.entries.get(position))
                .cloned()
                .collect(),
        }
    }
}

impl<K, V> Default for TsDict<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: PartialEq, V> FromIterator<(K, V)> for TsDict<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut dict = Self::new();
        dict.extend(iter);
        dict
    }
}

impl<K: PartialEq, V> Extend<(K, V)> for TsDict<K, V> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

impl<K, V> IntoIterator for TsDict<K, V> {
    type Item = (K, V);
    type IntoIter = std::vec::IntoIter<(K, V)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<K: Display, V: Display> Display for TsDict<K, V> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str("TsDict({")?;
        for (i, (key, value)) in self.entries.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}: {}", key, value)?;
        }
        f.write_str("})")
    }
}

impl<K: Serialize, V: Serialize> Serialize for TsDict<K, V> {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

struct TsDictVisitor<K, V>(PhantomData<(K, V)>);

impl<'de, K, V> Visitor<'de> for TsDictVisitor<K, V>
where
    K: Deserialize<'de> + PartialEq,
    V: Deserialize<'de>,
{
    type Value = TsDict<K, V>;

    fn expecting(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str("a map")
    }

    fn visit_map<A>(self, mut access: A) -> std::result::Result<Self::Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut dict = TsDict::new();
        while let Some((key, value)) = access.next_entry()? {
            dict.insert(key, value);
        }
        Ok(dict)
    }
}

impl<'de, K, V> Deserialize<'de> for TsDict<K, V>
where
    K: Deserialize<'de> + PartialEq,
    V: Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_map(TsDictVisitor(PhantomData))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ts::Ts;
    use crate::utils::error::TsError;

    fn sample() -> TsDict<String, f64> {
        [("a", 1.0), ("b", 2.0), ("c", 3.0)]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect()
    }

    #[test]
    fn test_select_by_value_keeps_keys() {
        let picked = sample().select(1.5..3.0).unwrap();
        assert_eq!(picked.len(), 1);
        assert_eq!(picked.get("b"), Some(&2.0));
        assert_eq!(picked.get("a"), None);
    }

    #[test]
    fn test_select_preserves_insertion_order() {
        let dict: TsDict<&str, i32> = [("z", 3), ("y", 1), ("x", 2)].into_iter().collect();
        let picked = dict.select(..10.0).unwrap();
        assert_eq!(picked.keys().copied().collect::<Vec<_>>(), vec!["z", "y", "x"]);
    }

    #[test]
    fn test_exact_lookup() {
        let mut dict = sample();
        dict.insert("d".to_string(), 2.0);
        let picked = dict.at(&2.0).unwrap();
        assert_eq!(picked.keys().cloned().collect::<Vec<_>>(), vec!["b", "d"]);
        assert!(dict.at(&9.0).unwrap().is_empty());
    }

    #[test]
    fn test_invalid_step() {
        for step in [0, -2] {
            let result = sample().select(Slice::from(0.0..5.0).with_step(step));
            assert!(matches!(result, Err(TsError::InvalidStep { .. })));
        }
    }

    #[test]
    fn test_step_over_matches() {
        let dict: TsDict<i32, f64> = (0..6).map(|i| (i, i as f64)).collect();
        let picked = dict.select(Slice::from(1.0..).with_step(2)).unwrap();
        assert_eq!(picked.keys().copied().collect::<Vec<_>>(), vec![1, 3, 5]);
    }

    #[test]
    fn test_select_keys() {
        let dict: TsDict<&str, &str> = [
            ("2024-12-24", "Christmas Eve"),
            ("2024-12-25", "1st Christmas Day"),
            ("2024-12-31", "New Years Eve"),
        ]
        .into_iter()
        .collect();
        let start = Ts::from_yyyymmdd(20241225).unwrap();
        let picked = dict.select_keys(start..).unwrap();
        assert_eq!(picked.len(), 2);
        assert_eq!(picked.get_index(0), Some((&"2024-12-25", &"1st Christmas Day")));
        assert_eq!(dict.at_key(&start).unwrap().len(), 1);
    }

    #[test]
    fn test_insert_replaces_in_place() {
        let mut dict = sample();
        assert_eq!(dict.insert("a".to_string(), 10.0), Some(1.0));
        assert_eq!(dict.get_index(0), Some((&"a".to_string(), &10.0)));
        assert_eq!(dict.remove("b"), Some(2.0));
        assert!(!dict.contains_key("b"));
    }

    #[test]
    fn test_serde_keeps_order() {
        let dict: TsDict<String, i32> = serde_json::from_str(r#"{"b": 1, "a": 2}"#).unwrap();
        assert_eq!(dict.get_index(0), Some((&"b".to_string(), &1)));
        assert_eq!(serde_json::to_string(&dict).unwrap(), r#"{"b":1,"a":2}"#);
        assert_eq!(dict.to_string(), "TsDict({b: 1, a: 2})");
    }
}
