//! Texture import sidecars (`<texture>.import`).
//!
//! Ids are derived from an MD5 digest of the texture's `res://` path so that
//! repeated runs produce byte-identical sidecars.

use std::path::{Path, PathBuf};

use md5::{Digest, Md5};

use crate::util::{Error, Result};

/// Import settings for one copied texture.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImportSidecar {
    file_name: String,
    res_path: String,
    digest: [u8; 16],
}

impl ImportSidecar {
    /// Sidecar for the texture `file_name` living at `res_path`.
    pub fn new(file_name: impl Into<String>, res_path: impl Into<String>) -> Self {
        let res_path = res_path.into();
        let mut hasher = Md5::new();
        hasher.update(res_path.as_bytes());
        Self {
            file_name: file_name.into(),
            res_path,
            digest: hasher.finalize().into(),
        }
    }

    /// `uid://b##########`, ten decimal digits.
    pub fn uid(&self) -> String {
        let mut head = [0u8; 8];
        head.copy_from_slice(&self.digest[..8]);
        format!("uid://b{:010}", u64::from_le_bytes(head) % 1_000_000_000)
    }

    /// Imported texture path inside the target project's cache.
    pub fn imported_path(&self) -> String {
        let hex: String = self.digest.iter().map(|b| format!("{:02x}", b)).collect();
        format!("res://.godot/imported/{}-{}.ctex", self.file_name, hex)
    }

    /// Render the sidecar text.
    pub fn render(&self) -> String {
        let imported = self.imported_path();
        format!(
            r#"[remap]

importer="texture"
type="CompressedTexture2D"
uid="{uid}"
path="{imported}"
metadata={{
"vram_texture": false
}}

[deps]

source_file="{source}"
dest_files=["{imported}"]

[params]

compress/mode=0
compress/high_quality=false
compress/lossy_quality=0.7
compress/hdr_compression=1
compress/normal_map=0
compress/channel_pack=0
mipmaps/generate=false
mipmaps/limit=-1
roughness/mode=0
roughness/src_normal=""
process/fix_alpha_border=true
process/premult_alpha=false
process/normal_map_invert_y=false
process/hdr_as_srgb=false
process/hdr_clamp_exposure=false
process/size_limit=0
detect_3d/compress_to=1
"#,
            uid = self.uid(),
            imported = imported,
            source = self.res_path,
        )
    }

    /// Write the sidecar next to `texture`; returns the sidecar path.
    pub fn write_next_to(&self, texture: &Path) -> Result<PathBuf> {
        let mut name = texture.as_os_str().to_owned();
        name.push(".import");
        let path = PathBuf::from(name);
        std::fs::write(&path, self.render()).map_err(|e| Error::io(&path, e))?;
        Ok(path)
    }
}
