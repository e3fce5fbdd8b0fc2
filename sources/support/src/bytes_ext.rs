//! Bounds-checked reads over a `bytes::Buf`.
//! `Buf::get_*` panics when the buffer runs dry; class files come from disk, so every read
//! made while parsing one goes through these instead.

use anyhow::{anyhow, Result};
use bytes::Buf;

macro_rules! safe_get {
    ($($ty: ident),*) => {
        paste::paste! {
            pub trait SafeBuf: Buf {
                $(
                    fn [<try_get_ $ty>](&mut self) -> Result<$ty> {
                        let needed = std::mem::size_of::<$ty>();
                        if self.remaining() < needed {
                            return Err(anyhow!(
                                "buffer exhausted reading {} (wanted {} bytes, {} left)",
                                stringify!($ty),
                                needed,
                                self.remaining()
                            ));
                        }

                        Ok(self.[<get_ $ty>]())
                    }
                )*

                fn try_get_bytes(&mut self, len: usize) -> Result<Vec<u8>> {
                    if self.remaining() < len {
                        return Err(anyhow!(
                            "buffer exhausted reading {} bytes ({} left)",
                            len,
                            self.remaining()
                        ));
                    }

                    let mut out = vec![0; len];
                    self.copy_to_slice(&mut out);
                    Ok(out)
                }
            }
        }
    };
}

safe_get!(u8, u16, u32, u64, i32, i64, f32, f64);

impl<T: Buf> SafeBuf for T {}
