//! C FFI bindings for Mach's host statistics interface. See
//! [`vm_statistics.h`](https://opensource.apple.com/source/xnu/xnu-7195.81.3/osfmk/mach/vm_statistics.h)
//! and [`host_info.h`](https://opensource.apple.com/source/xnu/xnu-7195.81.3/osfmk/mach/host_info.h).

use std::{io, mem, ptr};

use libc::c_void;
use mach2::{
    kern_return::{KERN_SUCCESS, kern_return_t},
    mach_port::mach_port_deallocate,
    message::mach_msg_type_number_t,
    port::mach_port_t,
    traps::mach_task_self,
    vm_types::{integer_t, natural_t},
};

use super::{HostStatistics, VmStatistics};
use crate::collection::memory::PageSize;

#[expect(non_camel_case_types)]
type host_t = mach_port_t;

#[expect(non_camel_case_types)]
type host_flavor_t = integer_t;

#[expect(non_camel_case_types)]
type host_info_t = *mut integer_t;

const HOST_VM_INFO: host_flavor_t = 2;

/// See `vm_statistics.h`. Every field is a page count.
#[repr(C)]
#[derive(Default)]
#[expect(non_camel_case_types)]
pub(crate) struct vm_statistics {
    pub free_count: natural_t,
    pub active_count: natural_t,
    pub inactive_count: natural_t,
    pub wire_count: natural_t,
    pub zero_fill_count: natural_t,
    pub reactivations: natural_t,
    pub pageins: natural_t,
    pub pageouts: natural_t,
    pub faults: natural_t,
    pub cow_faults: natural_t,
    pub lookups: natural_t,
    pub hits: natural_t,
    pub purgeable_count: natural_t,
    pub purges: natural_t,
    pub speculative_count: natural_t,
}

const HOST_VM_INFO_COUNT: mach_msg_type_number_t =
    (mem::size_of::<vm_statistics>() / mem::size_of::<integer_t>()) as mach_msg_type_number_t;

// SAFETY: Bindings like this are inherently unsafe. See `mach_host.h` for more details.
unsafe extern "C" {
    fn mach_host_self() -> host_t;

    fn host_statistics(
        host_priv: host_t, flavor: host_flavor_t, host_info_out: host_info_t,
        host_info_out_cnt: *mut mach_msg_type_number_t,
    ) -> kern_return_t;
}

/// The local Mach host.
#[derive(Clone, Copy, Debug, Default)]
pub struct MachHost;

impl HostStatistics for MachHost {
    fn vm_statistics(&self) -> Result<VmStatistics, i32> {
        let mut stats = vm_statistics::default();
        let mut count = HOST_VM_INFO_COUNT;

        // SAFETY: `stats` is large enough for `HOST_VM_INFO_COUNT` integers, which is
        // what `count` tells the kernel. The host port we get back is ours to release,
        // and is released whether or not the query succeeded.
        let result = unsafe {
            let host = mach_host_self();
            let result = host_statistics(
                host,
                HOST_VM_INFO,
                ptr::from_mut(&mut stats).cast(),
                &mut count,
            );
            mach_port_deallocate(mach_task_self(), host);

            result
        };

        if result != KERN_SUCCESS {
            return Err(result);
        }

        Ok(VmStatistics {
            free_count: stats.free_count,
            active_count: stats.active_count,
            inactive_count: stats.inactive_count,
            wire_count: stats.wire_count,
            pageins: stats.pageins,
            pageouts: stats.pageouts,
        })
    }

    fn memsize(&self) -> io::Result<Vec<u8>> {
        let mut buf = [0u8; 8];
        let mut size = buf.len();

        // SAFETY: The name is NUL-terminated, and `buf`/`size` describe a valid,
        // writable buffer. On success, `size` holds how much of it was written.
        let result = unsafe {
            libc::sysctlbyname(
                c"hw.memsize".as_ptr(),
                buf.as_mut_ptr().cast::<c_void>(),
                &mut size,
                ptr::null_mut(),
                0,
            )
        };

        if result < 0 {
            return Err(io::Error::last_os_error());
        }

        Ok(buf[..size.min(buf.len())].to_vec())
    }

    fn page_size(&self) -> PageSize {
        PageSize::from_sysconf()
    }
}
