//! C FFI bindings for `libkstat`. See `sys/kstat.h` and `kstat.h` in
//! [illumos](https://github.com/illumos/illumos-gate/blob/master/usr/src/uts/common/sys/kstat.h).

use std::{
    ffi::{CString, c_char, c_int, c_uchar, c_uint, c_void},
    io,
    ptr::{self, NonNull},
    slice,
};

use super::{KstatProvider, KstatSession, NamedTable, NamedValue};
use crate::collection::error::{CollectionError, CollectionResult};

const KSTAT_STRLEN: usize = 31;

const KSTAT_TYPE_NAMED: c_uchar = 1;

const KSTAT_DATA_INT32: c_uchar = 1;
const KSTAT_DATA_UINT32: c_uchar = 2;
const KSTAT_DATA_INT64: c_uchar = 3;
const KSTAT_DATA_UINT64: c_uchar = 4;

#[expect(non_camel_case_types)]
type kid_t = c_int;

#[expect(non_camel_case_types)]
type hrtime_t = i64;

/// See `kstat.h`.
#[repr(C)]
#[expect(non_camel_case_types)]
pub(crate) struct kstat_ctl_t {
    pub kc_chain_id: kid_t,
    pub kc_chain: *mut kstat_t,
    pub kc_kd: c_int,
}

/// See `sys/kstat.h`.
#[repr(C)]
#[expect(non_camel_case_types)]
pub(crate) struct kstat_t {
    pub ks_crtime: hrtime_t,
    pub ks_next: *mut kstat_t,
    pub ks_kid: kid_t,
    pub ks_module: [c_char; KSTAT_STRLEN],
    pub ks_resv: c_uchar,
    pub ks_instance: c_int,
    pub ks_name: [c_char; KSTAT_STRLEN],
    pub ks_type: c_uchar,
    pub ks_class: [c_char; KSTAT_STRLEN],
    pub ks_flags: c_uchar,
    pub ks_data: *mut c_void,
    pub ks_ndata: c_uint,
    pub ks_data_size: usize,
    pub ks_snaptime: hrtime_t,
    pub ks_update: Option<unsafe extern "C" fn(*mut kstat_t, c_int) -> c_int>,
    pub ks_private: *mut c_void,
    pub ks_snapshot: Option<unsafe extern "C" fn(*mut kstat_t, *mut c_void, c_int) -> c_int>,
    pub ks_lock: *mut c_void,
}

#[repr(C)]
#[derive(Clone, Copy)]
#[expect(non_camel_case_types)]
pub(crate) struct kstat_named_str {
    pub addr: *mut c_char,
    pub len: u32,
}

#[repr(C)]
#[derive(Clone, Copy)]
#[expect(non_camel_case_types)]
pub(crate) union kstat_named_value {
    pub c: [c_char; 16],
    pub i32: i32,
    pub ui32: u32,
    pub str: kstat_named_str,
    pub i64: i64,
    pub ui64: u64,
}

/// See `sys/kstat.h`.
#[repr(C)]
#[expect(non_camel_case_types)]
pub(crate) struct kstat_named_t {
    pub name: [c_char; KSTAT_STRLEN],
    pub data_type: c_uchar,
    pub value: kstat_named_value,
}

// SAFETY: Bindings like this are inherently unsafe. See `kstat(3KSTAT)` for
// more details.
#[link(name = "kstat")]
unsafe extern "C" {
    fn kstat_open() -> *mut kstat_ctl_t;

    fn kstat_close(kc: *mut kstat_ctl_t) -> c_int;

    fn kstat_lookup(
        kc: *mut kstat_ctl_t, module: *const c_char, instance: c_int, name: *const c_char,
    ) -> *mut kstat_t;

    fn kstat_read(kc: *mut kstat_ctl_t, ksp: *mut kstat_t, buf: *mut c_void) -> kid_t;
}

/// The system's `libkstat`.
#[derive(Clone, Copy, Debug, Default)]
pub struct LibKstat;

impl KstatProvider for LibKstat {
    type Session = KstatCtl;

    fn open(&self) -> CollectionResult<KstatCtl> {
        // SAFETY: No arguments; a null return means failure, with errno set.
        let kc = unsafe { kstat_open() };

        NonNull::new(kc)
            .map(KstatCtl)
            .ok_or_else(|| CollectionError::SessionOpen(io::Error::last_os_error()))
    }
}

/// An open `kstat_ctl_t`. Closed on drop.
#[derive(Debug)]
pub struct KstatCtl(NonNull<kstat_ctl_t>);

impl KstatSession for KstatCtl {
    fn lookup(
        &mut self, module: &'static str, instance: i32, name: &'static str,
    ) -> CollectionResult<NamedTable> {
        let error =
            |source: io::Error| CollectionError::table_lookup(module, instance, name, source);

        let c_module = CString::new(module).map_err(|err| error(err.into()))?;
        let c_name = CString::new(name).map_err(|err| error(err.into()))?;

        // SAFETY: `self.0` is an open chain, and both strings are NUL-terminated.
        let ksp = unsafe {
            kstat_lookup(
                self.0.as_ptr(),
                c_module.as_ptr(),
                instance,
                c_name.as_ptr(),
            )
        };
        let Some(ksp) = NonNull::new(ksp) else {
            return Err(error(io::Error::last_os_error()));
        };

        // SAFETY: `ksp` came from this chain. A null buffer means the data is read
        // into the kstat's own `ks_data`.
        if unsafe { kstat_read(self.0.as_ptr(), ksp.as_ptr(), ptr::null_mut()) } == -1 {
            return Err(error(io::Error::last_os_error()));
        }

        // SAFETY: `ksp` is valid for as long as the chain is open, which outlives
        // this borrow.
        let ks = unsafe { ksp.as_ref() };
        if ks.ks_type != KSTAT_TYPE_NAMED || ks.ks_data.is_null() {
            return Err(error(io::Error::new(
                io::ErrorKind::InvalidData,
                "not a named kstat",
            )));
        }

        // SAFETY: For a named kstat, a successful read leaves `ks_ndata` entries of
        // `kstat_named_t` at `ks_data`.
        let named = unsafe {
            slice::from_raw_parts(ks.ks_data.cast::<kstat_named_t>(), ks.ks_ndata as usize)
        };

        Ok(named
            .iter()
            .map(|entry| (field_name(&entry.name), named_value(entry)))
            .collect())
    }
}

impl Drop for KstatCtl {
    fn drop(&mut self) {
        // SAFETY: The pointer came from `kstat_open`, and this is the only place
        // it is closed.
        unsafe {
            kstat_close(self.0.as_ptr());
        }
    }
}

fn field_name(name: &[c_char; KSTAT_STRLEN]) -> String {
    name.iter()
        .take_while(|c| **c != 0)
        .map(|c| *c as u8 as char)
        .collect()
}

fn named_value(entry: &kstat_named_t) -> NamedValue {
    // SAFETY: Only the union member matching the declared type is read.
    unsafe {
        match entry.data_type {
            KSTAT_DATA_INT32 => NamedValue::Int32(entry.value.i32),
            KSTAT_DATA_UINT32 => NamedValue::Uint32(entry.value.ui32),
            KSTAT_DATA_INT64 => NamedValue::Int64(entry.value.i64),
            KSTAT_DATA_UINT64 => NamedValue::Uint64(entry.value.ui64),
            other => NamedValue::Other(other),
        }
    }
}
