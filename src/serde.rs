//! Serde support: a [`BalancedTree`] is a sequence in ascending order and an
//! [`OrderedMap`] is a map from each key to its list of values.

use core::fmt;
use core::marker::PhantomData;

use ::serde::de::{self, MapAccess, SeqAccess, Visitor};
use ::serde::ser::{SerializeMap, SerializeSeq};
use ::serde::{Deserialize, Deserializer, Serialize, Serializer};
use alloc::vec::Vec;

use crate::comparator::Comparator;
use crate::{BalancedTree, OrderedMap, Page};

impl<T: Serialize, C> Serialize for BalancedTree<T, C> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut seq = serializer.serialize_seq(Some(self.len()))?;
        for value in self {
            seq.serialize_element(value)?;
        }
        seq.end()
    }
}

struct BalancedTreeVisitor<T, C> {
    marker: PhantomData<fn() -> BalancedTree<T, C>>,
}

impl<'de, T, C> Visitor<'de> for BalancedTreeVisitor<T, C>
where
    T: Deserialize<'de>,
    C: Comparator<T> + Default,
{
    type Value = BalancedTree<T, C>;

    fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("a sequence of distinct elements")
    }

    fn visit_seq<A>(self, mut access: A) -> Result<Self::Value, A::Error>
    where
        A: SeqAccess<'de>,
    {
        let mut tree = BalancedTree::default();
        while let Some(value) = access.next_element()? {
            tree.add(value).map_err(de::Error::custom)?;
        }
        Ok(tree)
    }
}

impl<'de, T, C> Deserialize<'de> for BalancedTree<T, C>
where
    T: Deserialize<'de>,
    C: Comparator<T> + Default,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_seq(BalancedTreeVisitor { marker: PhantomData })
    }
}

impl<K: Serialize, V: Serialize, C> Serialize for OrderedMap<K, V, C> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for page in self {
            map.serialize_entry(page.key(), page.values())?;
        }
        map.end()
    }
}

struct OrderedMapVisitor<K, V, C> {
    marker: PhantomData<fn() -> OrderedMap<K, V, C>>,
}

impl<'de, K, V, C> Visitor<'de> for OrderedMapVisitor<K, V, C>
where
    K: Deserialize<'de>,
    V: Deserialize<'de>,
    C: Comparator<K> + Default,
{
    type Value = OrderedMap<K, V, C>;

    fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("a map from keys to non-empty lists of values")
    }

    fn visit_map<A>(self, mut access: A) -> Result<Self::Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut map = OrderedMap::default();
        while let Some((key, values)) = access.next_entry::<K, Vec<V>>()? {
            let page = Page::from_parts(key, values).ok_or_else(|| de::Error::invalid_length(0, &"at least one value per key"))?;
            if !map.insert_page(page) {
                return Err(de::Error::custom("duplicate key"));
            }
        }
        Ok(map)
    }
}

impl<'de, K, V, C> Deserialize<'de> for OrderedMap<K, V, C>
where
    K: Deserialize<'de>,
    V: Deserialize<'de>,
    C: Comparator<K> + Default,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_map(OrderedMapVisitor { marker: PhantomData })
    }
}
