//! Zip member selection and extraction.
//!
//! Members are looked up by their full name first and then by base name, so
//! an archive that wraps its files in a top-level folder still matches a
//! bare filename. Two members sharing a base name resolve to the first one.

use crate::error::{PipelineError, Result};
use std::io::{Cursor, Read};
use std::path::Path;
use zip::ZipArchive;

const NAME: &str = "zip";

/// One member read out of an archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedMember {
    /// Full name inside the archive.
    pub name: String,
    /// Base name, suitable as a cache filename.
    pub base_name: String,
    pub bytes: Vec<u8>,
}

pub struct Archive<'a> {
    archive: ZipArchive<Cursor<&'a [u8]>>,
    /// (full name, archive index) for every file entry, in archive order.
    members: Vec<(String, usize)>,
}

impl<'a> Archive<'a> {
    pub fn new(bytes: &'a [u8]) -> Result<Self> {
        let mut archive =
            ZipArchive::new(Cursor::new(bytes)).map_err(|e| PipelineError::parse(NAME, e))?;
        // Raw entries skip decryption and decompression, so a member that
        // cannot be read still holds its index and fails in `read` instead.
        let mut members = Vec::with_capacity(archive.len());
        for i in 0..archive.len() {
            let file = archive
                .by_index_raw(i)
                .map_err(|e| PipelineError::parse(NAME, e))?;
            if !file.is_dir() {
                members.push((file.name().to_string(), i));
            }
        }
        Ok(Archive { archive, members })
    }

    /// File members in archive order (directory entries excluded).
    pub fn member_names(&self) -> Vec<&str> {
        self.members.iter().map(|(n, _)| n.as_str()).collect()
    }

    /// Position of `name` among the file members: exact match, then base name.
    fn position_of(&self, name: &str) -> Option<usize> {
        self.members
            .iter()
            .position(|(n, _)| n == name)
            .or_else(|| {
                self.members
                    .iter()
                    .position(|(n, _)| base_name(n) == name)
            })
    }

    /// Resolves `requested` if it names a member, else the member at
    /// `fallback_index` among those accepted by `filter`.
    pub fn resolve<F>(&self, requested: Option<&str>, fallback_index: usize, filter: F) -> Result<usize>
    where
        F: Fn(&str) -> bool,
    {
        if let Some(pos) = requested.and_then(|name| self.position_of(name)) {
            return Ok(pos);
        }
        let candidates: Vec<usize> = self
            .members
            .iter()
            .enumerate()
            .filter(|(_, (n, _))| filter(n))
            .map(|(pos, _)| pos)
            .collect();
        candidates
            .get(fallback_index)
            .copied()
            .ok_or_else(|| PipelineError::MemberNotFound {
                requested: requested.map(str::to_string),
                index: fallback_index,
                available: candidates.len(),
            })
    }

    /// Reads the member at `pos` (as returned by `resolve`).
    pub fn read(&mut self, pos: usize) -> Result<SelectedMember> {
        let (name, index) = self.members[pos].clone();
        let mut file = self
            .archive
            .by_index(index)
            .map_err(|e| PipelineError::parse(NAME, format!("{}: {}", name, e)))?;
        let mut bytes = Vec::with_capacity(file.size() as usize);
        file.read_to_end(&mut bytes)
            .map_err(|e| PipelineError::parse(NAME, format!("{}: {}", name, e)))?;
        Ok(SelectedMember {
            base_name: base_name(&name).to_string(),
            name,
            bytes,
        })
    }

    /// Selects and reads a member: `requested` by name if present, else the
    /// file at `fallback_index`.
    pub fn select(&mut self, requested: Option<&str>, fallback_index: usize) -> Result<SelectedMember> {
        let pos = self.resolve(requested, fallback_index, |_| true)?;
        self.read(pos)
    }

    /// Extracts every member under `dir`, creating it as needed. Entry names
    /// that would escape `dir` are rejected by the zip reader.
    pub fn extract_all(&mut self, dir: &Path) -> Result<()> {
        std::fs::create_dir_all(dir)
            .map_err(|e| PipelineError::io(format!("create dir {}", dir.display()), e))?;
        self.archive.extract(dir).map_err(|e| match e {
            zip::result::ZipError::Io(source) => {
                PipelineError::io(format!("extract into {}", dir.display()), source)
            }
            other => PipelineError::parse(NAME, other),
        })
    }

    /// Full member name at `pos`.
    pub fn name_at(&self, pos: usize) -> &str {
        &self.members[pos].0
    }
}

fn base_name(name: &str) -> &str {
    name.rsplit('/').next().unwrap_or(name)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::SimpleFileOptions;

    /// Builds an in-memory zip from (name, content) pairs. Names ending in
    /// `/` become directory entries.
    pub(crate) fn zip_bytes(entries: &[(&str, &[u8])]) -> Vec<u8> {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default();
        for (name, content) in entries {
            if name.ends_with('/') {
                writer.add_directory(*name, options).unwrap();
            } else {
                writer.start_file(*name, options).unwrap();
                writer.write_all(content).unwrap();
            }
        }
        writer.finish().unwrap().into_inner()
    }

    #[test]
    fn selects_by_name() {
        let bytes = zip_bytes(&[("a.csv", b"x\n1\n"), ("b.csv", b"y\n2\n")]);
        let mut archive = Archive::new(&bytes).unwrap();
        let member = archive.select(Some("b.csv"), 0).unwrap();
        assert_eq!(member.name, "b.csv");
        assert_eq!(member.bytes, b"y\n2\n");
    }

    #[test]
    fn selects_by_index_when_name_absent() {
        let bytes = zip_bytes(&[("a.csv", b"x\n1\n"), ("b.csv", b"y\n2\n")]);
        let mut archive = Archive::new(&bytes).unwrap();
        let by_index = archive.select(None, 1).unwrap();
        assert_eq!(by_index.bytes, b"y\n2\n");
        let unknown_name = archive.select(Some("renamed.csv"), 0).unwrap();
        assert_eq!(unknown_name.name, "a.csv");
    }

    #[test]
    fn matches_base_name_inside_folder() {
        let bytes = zip_bytes(&[
            ("export/", b""),
            ("export/readme.txt", b"hi"),
            ("export/data.csv", b"a\n1\n"),
        ]);
        let mut archive = Archive::new(&bytes).unwrap();
        assert_eq!(archive.member_names(), vec!["export/readme.txt", "export/data.csv"]);
        let member = archive.select(Some("data.csv"), 0).unwrap();
        assert_eq!(member.name, "export/data.csv");
        assert_eq!(member.base_name, "data.csv");
    }

    #[test]
    fn out_of_range_index_is_member_not_found() {
        let bytes = zip_bytes(&[("a.csv", b"x\n")]);
        let mut archive = Archive::new(&bytes).unwrap();
        let err = archive.select(Some("missing.csv"), 3).unwrap_err();
        match err {
            PipelineError::MemberNotFound {
                requested,
                index,
                available,
            } => {
                assert_eq!(requested.as_deref(), Some("missing.csv"));
                assert_eq!(index, 3);
                assert_eq!(available, 1);
            }
            other => panic!("expected MemberNotFound, got {other:?}"),
        }
    }

    #[test]
    fn empty_archive_is_member_not_found() {
        let bytes = zip_bytes(&[]);
        let mut archive = Archive::new(&bytes).unwrap();
        assert!(matches!(
            archive.select(None, 0),
            Err(PipelineError::MemberNotFound { available: 0, .. })
        ));
    }

    #[test]
    fn filtered_fallback_counts_only_matching_members() {
        let bytes = zip_bytes(&[
            ("parcels.dbf", b""),
            ("parcels.shp", b""),
            ("roads.shp", b""),
        ]);
        let archive = Archive::new(&bytes).unwrap();
        let pos = archive
            .resolve(None, 1, |n| n.ends_with(".shp"))
            .unwrap();
        assert_eq!(archive.name_at(pos), "roads.shp");
    }

    #[test]
    fn not_a_zip_is_parse_error() {
        assert!(matches!(
            Archive::new(b"a,b\n1,2\n"),
            Err(PipelineError::Parse { format: "zip", .. })
        ));
    }

    #[test]
    fn extract_all_writes_members() {
        let bytes = zip_bytes(&[("parcels.shp", b"shp"), ("parcels.dbf", b"dbf")]);
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("parcels");
        Archive::new(&bytes).unwrap().extract_all(&target).unwrap();
        assert_eq!(std::fs::read(target.join("parcels.dbf")).unwrap(), b"dbf");
        assert_eq!(std::fs::read(target.join("parcels.shp")).unwrap(), b"shp");
    }

    /// Sets the "encrypted" flag bit on the first entry's local and central headers.
    fn mark_first_entry_encrypted(bytes: &mut [u8]) {
        let local = bytes.windows(4).position(|w| w == b"PK\x03\x04").unwrap();
        bytes[local + 6] |= 1;
        let central = bytes.windows(4).position(|w| w == b"PK\x01\x02").unwrap();
        bytes[central + 8] |= 1;
    }

    #[test]
    fn unreadable_member_keeps_indices_and_fails_on_read() {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        let stored = SimpleFileOptions::default().compression_method(zip::CompressionMethod::Stored);
        writer.start_file("a.csv", stored).unwrap();
        writer.write_all(b"x\n1\n").unwrap();
        writer.start_file("b.csv", stored).unwrap();
        writer.write_all(b"y\n2\n").unwrap();
        let mut bytes = writer.finish().unwrap().into_inner();
        mark_first_entry_encrypted(&mut bytes);

        let mut archive = Archive::new(&bytes).unwrap();
        assert_eq!(archive.member_names(), vec!["a.csv", "b.csv"]);
        let err = archive.select(None, 0).unwrap_err();
        assert!(matches!(err, PipelineError::Parse { format: "zip", .. }));
        assert!(err.to_string().contains("a.csv"));
        assert_eq!(archive.select(None, 1).unwrap().bytes, b"y\n2\n");
    }
}
