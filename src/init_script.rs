//! The `/init` script run by the kernel after unpacking the image.
//!
//! It mounts the pseudo filesystems, lets udev populate `/dev`, assembles md
//! and LVM devices, fscks and mounts the root (and a separate `/usr` from
//! the new root's fstab), then `switch_root`s into `/sbin/init`. Passing
//! `fixme` on the kernel command line drops into a shell first.

use std::fs;
use std::io;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Path of the script inside the image.
pub const INIT_PATH: &str = "init";

/// Script body, written byte for byte.
pub const INIT_SCRIPT: &str = r#"#!/bin/bash

export PATH=/sbin:/usr/bin:/bin
export EDITOR=ed

function edo() {
    [ -e /dev/kmsg ] && echo "initrd: $*" >/dev/kmsg
    $* 2>&1 >/dev/kmsg || ( echo "Bailing..." ; exec /bin/bash )
}

# mount important stuff
edo mount -n -t devtmpfs -o mode=0755 udev /dev
edo mkdir /dev/shm /dev/pts 
edo mkdir -p -m 0755 /dev/.udev/rules.d
edo mount -n -t devpts -o gid=5,mode=620 devpts /dev/pts
edo mount -n -t tmpfs tmpfs /dev/shm
edo mount -n -t sysfs none /sys
edo mount -n -t proc none /proc
cmdline=$(cat /proc/cmdline)
edo mount -n -t tmpfs tmpfs /run

# let udev do its thing
edo udevd --daemon --resolve-names=never
edo udevadm settle

# set up some nice block devices to mount
edo mdadm --quiet --assemble --scan
edo vgchange -a y

# pass fixme in kernel args to get a shell for fixing things
for arg in $cmdline ; do
    if [[ "$arg" == fixme ]] ; then
        ( export PS1='fixme$ ' ; bash )
        break
    fi
done

# the important bit: mount root, and /usr if defined
root_mounted=""
for arg in $cmdline ; do
    if [[ "$arg" == root=* ]] ; then
        edo fsck -a "${arg:5}"
        edo mount -n -r "${arg:5}" /newroot
        root_mounted="true"
        break
    fi
done
edo [ $root_mounted ]
( while read -r dev mountpoint type opts rest ; do
    if [[ "$dev" != \#* ]] && [[ "$mountpoint" == /usr ]] ; then
        edo fsck -a "$dev"
        edo mount -n -r -t "$type" -o "$opts" "$dev" /newroot/usr
        break
    fi
done ) </newroot/etc/fstab 

# clean up
edo udevadm control --exit
edo umount -n /dev/pts
edo umount -n /dev/shm
edo mount --move /run /newroot/run

# sanity check
edo [ -x /newroot/sbin/init ]

# switch to the new root
edo exec switch_root /newroot /sbin/init $cmdline
"#;

/// Write the init script into `staging_root` and mark it executable.
pub fn write_init_script(staging_root: &Path) -> Result<PathBuf> {
    let path = staging_root.join(INIT_PATH);
    let fail = |source: io::Error| Error::Materialization {
        path: PathBuf::from("/").join(INIT_PATH),
        source,
    };

    fs::write(&path, INIT_SCRIPT).map_err(fail)?;
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).map_err(fail)?;
    Ok(path)
}
