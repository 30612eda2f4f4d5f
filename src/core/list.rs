use std::fmt::{Display, Formatter};
use std::ops::{Add, Bound, Div, Index, Mul, Neg, RangeBounds, Sub};

use serde::{Deserialize, Serialize};

use crate::core::convert::{Construct, ConversionHook, Domain};
use crate::core::slice::{exact_positions, Slice};
use crate::utils::error::Result;

/// List whose slices select by value rather than by position.
///
/// ```
/// use tslist::TsList;
///
/// let mut list = TsList::from(vec![1.0, 1.1, 1.2, 1.3]);
/// assert_eq!(list.select(1.0..1.3).unwrap(), TsList::from(vec![1.0, 1.1, 1.2]));
/// assert_eq!(list.select(1.0..1.31).unwrap().len(), 4);
///
/// list.push(1.1);
/// assert_eq!(list.at(&1.1).unwrap(), TsList::from(vec![1.1, 1.1]));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TsList<T> {
    items: Vec<T>,
}

impl<T> TsList<T> {
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn push(&mut self, item: T) {
        self.items.push(item);
    }

    /// Inserts at `index`, appending when `index` is past the end.
    pub fn insert(&mut self, index: usize, item: T) {
        let index = index.min(self.items.len());
        self.items.insert(index, item);
    }

    pub fn remove(&mut self, index: usize) -> Option<T> {
        (index < self.items.len()).then(|| self.items.remove(index))
    }

    pub fn pop(&mut self) -> Option<T> {
        self.items.pop()
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.items.get(index)
    }

    pub fn first(&self) -> Option<&T> {
        self.items.first()
    }

    pub fn last(&self) -> Option<&T> {
        self.items.last()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    pub fn into_inner(self) -> Vec<T> {
        self.items
    }

    /// Applies `f` to every item.
    pub fn map<U, F: FnMut(&T) -> U>(&self, f: F) -> TsList<U> {
        self.items.iter().map(f).collect()
    }
}

impl<T: Clone> TsList<T> {
    /// Items whose value in the domain `D` lies in `slice`, in list
    /// order, every `step`-th match when a step is given.
    pub fn select<D, S>(&self, slice: S) -> Result<Self>
    where
        S: Into<Slice<D>>,
        D: Domain + Construct<T>,
        T: ConversionHook<D>,
    {
        let positions = slice.into().matching_positions(self.items.iter())?;
        Ok(self.pick(&positions))
    }

    /// Items whose value in the domain of `value` equals it. No match
    /// gives an empty list.
    pub fn at<D>(&self, value: &D) -> Result<Self>
    where
        D: Domain + Construct<T>,
        T: ConversionHook<D>,
    {
        let positions = exact_positions(self.items.iter(), value)?;
        Ok(self.pick(&positions))
    }

    /// Plain positional slice; bounds past the end are clamped.
    pub fn positions<R: RangeBounds<usize>>(&self, range: R) -> Self {
        let len = self.items.len();
        let start = match range.start_bound() {
            Bound::Included(&start) => start,
            Bound::Excluded(&start) => start.saturating_add(1),
            Bound::Unbounded => 0,
        }
        .min(len);
        let end = match range.end_bound() {
            Bound::Included(&end) => end.saturating_add(1),
            Bound::Excluded(&end) => end,
            Bound::Unbounded => len,
        }
        .min(len);
        if start >= end {
            return Self::new();
        }
        self.items[start..end].iter().cloned().collect()
    }

    pub fn concat(&self, other: &Self) -> Self {
        self.items.iter().chain(other.items.iter()).cloned().collect()
    }

    fn pick(&self, positions: &[usize]) -> Self {
        positions
            .iter()
            .filter_map(|&position| self.items.get(position))
            .cloned()
            .collect()
    }
}

impl<T> Index<usize> for TsList<T> {
    type Output = T;

    fn index(&self, index: usize) -> &T {
        &self.items[index]
    }
}

impl<T> From<Vec<T>> for TsList<T> {
    fn from(items: Vec<T>) -> Self {
        Self { items }
    }
}

impl<T> FromIterator<T> for TsList<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self {
            items: iter.into_iter().collect(),
        }
    }
}

impl<T> Extend<T> for TsList<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        self.items.extend(iter);
    }
}

impl<T> IntoIterator for TsList<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'a, T> IntoIterator for &'a TsList<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl<T: Display> Display for TsList<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str("TsList([")?;
        for (i, item) in self.items.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", item)?;
        }
        f.write_str("])")
    }
}

impl<T: Neg> Neg for TsList<T> {
    type Output = TsList<T::Output>;

    fn neg(self) -> Self::Output {
        self.items.into_iter().map(Neg::neg).collect()
    }
}

// Arithmetic with a scalar applies to every item.
macro_rules! distribute {
    ($($op:ident :: $method:ident),+ $(,)?) => {
        $(
            impl<T, R> $op<R> for TsList<T>
            where
                T: $op<R>,
                R: Clone,
            {
                type Output = TsList<T::Output>;

                fn $method(self, other: R) -> Self::Output {
                    self.items
                        .into_iter()
                        .map(|item| item.$method(other.clone()))
                        .collect()
                }
            }
        )+
    };
}

distribute!(Add::add, Sub::sub, Mul::mul, Div::div);
