use std::{
    io::{Error, ErrorKind, Read, Result, Write},
    marker::PhantomData,
    ops::Deref,
};

use borsh::{BorshDeserialize, BorshSerialize};

/// A `Vec` whose borsh length prefix is `L` instead of `u32`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmallVec<L, T>(Vec<T>, PhantomData<L>);

impl<L, T> SmallVec<L, T> {
    /// Returns the inner `Vec`.
    pub fn into_inner(self) -> Vec<T> {
        self.0
    }
}

impl<L, T> Default for SmallVec<L, T> {
    fn default() -> Self {
        Self(Vec::default(), PhantomData)
    }
}

impl<L, T> Deref for SmallVec<L, T> {
    type Target = [T];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<L, T> From<Vec<T>> for SmallVec<L, T> {
    fn from(value: Vec<T>) -> Self {
        Self(value, PhantomData)
    }
}

impl<L, T> From<SmallVec<L, T>> for Vec<T> {
    fn from(value: SmallVec<L, T>) -> Self {
        value.0
    }
}

macro_rules! impl_borsh {
    ($len:ty) => {
        impl<T: BorshSerialize> BorshSerialize for SmallVec<$len, T> {
            fn serialize<W: Write>(&self, writer: &mut W) -> Result<()> {
                let len = <$len>::try_from(self.0.len()).map_err(|_| {
                    Error::new(
                        ErrorKind::InvalidInput,
                        concat!("too many items for a ", stringify!($len), " length prefix"),
                    )
                })?;
                writer.write_all(&len.to_le_bytes())?;
                for item in self.0.iter() {
                    item.serialize(writer)?;
                }
                Ok(())
            }
        }

        impl<T: BorshDeserialize> BorshDeserialize for SmallVec<$len, T> {
            fn deserialize_reader<R: Read>(reader: &mut R) -> Result<Self> {
                let len = <$len>::deserialize_reader(reader)?;
                let mut items = Vec::with_capacity(usize::from(len));
                for _ in 0..len {
                    items.push(T::deserialize_reader(reader)?);
                }
                Ok(Self(items, PhantomData))
            }
        }
    };
}

impl_borsh!(u8);
impl_borsh!(u16);
