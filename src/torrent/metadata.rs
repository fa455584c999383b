use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
    time::{Duration, SystemTime, UNIX_EPOCH},
};

use log::{debug, warn};
use serde::Serialize;

use crate::bencode::{parse, BValue};
use crate::hash::{sha1, InfoHash, Sha1Hash, SHA1_LEN};
use crate::torrent::{calculate_info_hash, FileInfo, TorrentError};

type Dict = BTreeMap<Vec<u8>, BValue>;

/// Represents a .torrent file: the trackers, optional metadata and the
/// decoded `info` dictionary.
///
/// Built once by [`Torrent::from_bvalue`] and read-only afterwards.
#[derive(Debug, Clone, Serialize)]
pub struct Torrent {
    announce: String,
    announce_list: Vec<Vec<String>>,
    comment: Option<String>,
    created_by: Option<String>,
    creation_date: Option<i64>,
    info: TorrentInfo,
    info_hash: InfoHash,
    #[serde(skip)]
    info_bytes: Vec<u8>,
}

/// Contains detailed metadata about the torrent's content.
#[derive(Debug, Clone, Serialize)]
pub struct TorrentInfo {
    name: String,
    piece_length: u64,
    pieces: Vec<Sha1Hash>,
    files: Vec<FileInfo>,
    total_size: u64,
}

impl Torrent {
    /// Reads a .torrent file from disk and decodes it.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, TorrentError> {
        let path = path.as_ref();
        let buf = std::fs::read(path).map_err(|e| {
            TorrentError::InvalidFormat(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_bytes(&buf)
    }

    /// Decodes raw metainfo bytes. The whole buffer must be one bencode value.
    pub fn from_bytes(data: &[u8]) -> Result<Self, TorrentError> {
        let value = parse(data).map_err(|e| TorrentError::InvalidFormat(e.to_string()))?;
        Self::from_bvalue(&value)
    }

    /// Creates a `Torrent` from a parsed metainfo dictionary.
    pub fn from_bvalue(value: &BValue) -> Result<Self, TorrentError> {
        let root_dict = match value {
            BValue::Dict(m) => m,
            other => {
                return Err(TorrentError::InvalidFormat(format!(
                    "root of .torrent must be a dictionary, got {}",
                    other.kind()
                )))
            }
        };

        let announce = get_string(root_dict, "announce")?;
        let announce_list = parse_announce_list(root_dict);
        let comment = optional_string(root_dict, "comment");
        let created_by = optional_string(root_dict, "created by");
        let creation_date = root_dict
            .get(b"creation date".as_slice())
            .and_then(BValue::as_integer);

        let info_value = root_dict
            .get(b"info".as_slice())
            .ok_or(TorrentError::MissingRequiredField("info"))?;
        let info_dict = info_value
            .as_dict()
            .ok_or(TorrentError::InvalidFieldType("info"))?;

        let info = TorrentInfo::from_bvalue(info_dict)?;
        // hash the value as parsed, never the re-derived struct
        let (info_hash, info_bytes) = calculate_info_hash(info_value);

        debug!(
            "decoded torrent '{}': {} files, {} pieces, info hash {}",
            info.name,
            info.files.len(),
            info.pieces.len(),
            info_hash
        );

        Ok(Torrent {
            announce,
            announce_list,
            comment,
            created_by,
            creation_date,
            info,
            info_hash,
            info_bytes,
        })
    }

    pub fn info(&self) -> &TorrentInfo {
        &self.info
    }

    pub fn info_hash(&self) -> &InfoHash {
        &self.info_hash
    }

    /// Canonical bencoding of the `info` dictionary, the input of the info hash.
    pub fn info_bytes(&self) -> &[u8] {
        &self.info_bytes
    }

    pub fn announce(&self) -> &str {
        &self.announce
    }

    /// Tracker tiers from `announce-list`; empty when the field is absent.
    pub fn announce_list(&self) -> &[Vec<String>] {
        &self.announce_list
    }

    /// Every tracker URL in tier order without duplicates. Falls back to
    /// `announce` when there is no usable announce-list.
    pub fn trackers(&self) -> Vec<&str> {
        let mut urls: Vec<&str> = Vec::new();
        for url in self.announce_list.iter().flatten() {
            if !urls.contains(&url.as_str()) {
                urls.push(url);
            }
        }
        if urls.is_empty() {
            urls.push(&self.announce);
        }
        urls
    }

    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }

    pub fn created_by(&self) -> Option<&str> {
        self.created_by.as_deref()
    }

    /// Unix timestamp in seconds.
    pub fn creation_date(&self) -> Option<i64> {
        self.creation_date
    }

    pub fn creation_time(&self) -> Option<SystemTime> {
        let secs = self.creation_date?;
        if secs >= 0 {
            UNIX_EPOCH.checked_add(Duration::from_secs(secs as u64))
        } else {
            UNIX_EPOCH.checked_sub(Duration::from_secs(secs.unsigned_abs()))
        }
    }

    pub fn name(&self) -> &str {
        self.info.name()
    }

    pub fn total_size(&self) -> u64 {
        self.info.total_size()
    }

    pub fn piece_length(&self) -> u64 {
        self.info.piece_length()
    }

    pub fn piece_count(&self) -> usize {
        self.info.piece_count()
    }

    pub fn piece_hashes(&self) -> &[Sha1Hash] {
        self.info.piece_hashes()
    }

    pub fn files(&self) -> &[FileInfo] {
        self.info.files()
    }

    pub fn is_single_file(&self) -> bool {
        self.info.is_single_file()
    }

    pub fn piece_size(&self, index: usize) -> u64 {
        self.info.piece_size(index)
    }

    pub fn verify_piece_hash(&self, index: usize, hash: &Sha1Hash) -> bool {
        self.info.verify_piece_hash(index, hash)
    }

    pub fn verify_piece(&self, index: usize, data: &[u8]) -> bool {
        self.info.verify_piece(index, data)
    }
}

impl TorrentInfo {
    pub fn from_bvalue(info_dict: &Dict) -> Result<Self, TorrentError> {
        let name = get_string(info_dict, "name")?;
        // the name is the file itself or the root directory of every file
        if !is_safe_segment(&name) {
            return Err(TorrentError::InvalidFieldType("name"));
        }

        let piece_length = get_integer(info_dict, "piece length")?;
        if piece_length <= 0 {
            return Err(TorrentError::InvalidPieceLength(piece_length));
        }

        let pieces = parse_piece_hashes(lookup_bytestring(info_dict, "pieces")?)?;
        let files = parse_files(info_dict, &name)?;
        let total_size = files.iter().map(|f| f.length).sum();

        Ok(TorrentInfo {
            name,
            piece_length: piece_length as u64,
            pieces,
            files,
            total_size,
        })
    }

    /// Display name; also the file name (single-file) or root directory.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Sum of all file lengths.
    pub fn total_size(&self) -> u64 {
        self.total_size
    }

    pub fn piece_length(&self) -> u64 {
        self.piece_length
    }

    pub fn piece_count(&self) -> usize {
        self.pieces.len()
    }

    pub fn piece_hashes(&self) -> &[Sha1Hash] {
        &self.pieces
    }

    pub fn files(&self) -> &[FileInfo] {
        &self.files
    }

    pub fn is_single_file(&self) -> bool {
        self.files.len() == 1
    }

    /// Size in bytes of piece `index`, 0 when out of range. Only the last
    /// piece may be short.
    pub fn piece_size(&self, index: usize) -> u64 {
        if index >= self.pieces.len() {
            return 0;
        }

        if index == self.pieces.len() - 1 {
            let remainder = self.total_size % self.piece_length;
            return if remainder == 0 { self.piece_length } else { remainder };
        }

        self.piece_length
    }

    pub fn verify_piece_hash(&self, index: usize, hash: &Sha1Hash) -> bool {
        self.pieces.get(index) == Some(hash)
    }

    /// Hashes `data` and compares it against the expected digest of piece `index`.
    pub fn verify_piece(&self, index: usize, data: &[u8]) -> bool {
        index < self.pieces.len() && self.verify_piece_hash(index, &sha1(data))
    }
}

fn parse_piece_hashes(pieces: &[u8]) -> Result<Vec<Sha1Hash>, TorrentError> {
    if pieces.len() % SHA1_LEN != 0 {
        return Err(TorrentError::InvalidPieceHash(pieces.len()));
    }

    Ok(pieces
        .chunks_exact(SHA1_LEN)
        .filter_map(Sha1Hash::from_slice)
        .collect())
}

/// `length` signals single-file mode; otherwise `files` must list every file.
fn parse_files(info_dict: &Dict, name: &str) -> Result<Vec<FileInfo>, TorrentError> {
    if info_dict.contains_key(b"length".as_slice()) {
        if info_dict.contains_key(b"files".as_slice()) {
            warn!("torrent '{}' has both 'length' and 'files', using 'length'", name);
        }
        let length = get_length(info_dict)?;
        return Ok(vec![FileInfo::new(name, length, 0)]);
    }

    let files_list = match info_dict.get(b"files".as_slice()) {
        None => return Err(TorrentError::MissingRequiredField("files")),
        Some(BValue::List(l)) => l,
        Some(_) => return Err(TorrentError::InvalidFieldType("files")),
    };

    let mut files = Vec::with_capacity(files_list.len());
    let mut offset: u64 = 0;

    for file_value in files_list {
        let file_dict = file_value
            .as_dict()
            .ok_or(TorrentError::InvalidFieldType("files"))?;

        let length = get_length(file_dict)?;
        let path = parse_path(file_dict, name)?;

        files.push(FileInfo::new(path, length, offset));
        offset = offset
            .checked_add(length)
            .ok_or(TorrentError::InvalidFieldType("length"))?;
    }

    Ok(files)
}

/// Joins the `path` segments under the torrent name. Segments that would
/// leave the root directory are rejected.
fn parse_path(file_dict: &Dict, name: &str) -> Result<PathBuf, TorrentError> {
    let segments = match file_dict.get(b"path".as_slice()) {
        None => return Err(TorrentError::MissingRequiredField("path")),
        Some(BValue::List(l)) if !l.is_empty() => l,
        Some(_) => return Err(TorrentError::InvalidFieldType("path")),
    };

    let mut file_path = PathBuf::from(name);
    for segment in segments {
        let segment = segment
            .as_bytes()
            .ok_or(TorrentError::InvalidFieldType("path"))?;
        let segment = String::from_utf8_lossy(segment);
        if !is_safe_segment(&segment) {
            return Err(TorrentError::InvalidFieldType("path"));
        }
        file_path.push(segment.as_ref());
    }
    Ok(file_path)
}

fn is_safe_segment(segment: &str) -> bool {
    !segment.is_empty()
        && segment != "."
        && segment != ".."
        && !segment.contains(|c: char| matches!(c, '/' | '\\' | '\0'))
}

/// Tiers that are not lists and URLs that are not byte strings are skipped;
/// tiers left empty are dropped.
fn parse_announce_list(root: &Dict) -> Vec<Vec<String>> {
    let Some(tiers) = root.get(b"announce-list".as_slice()).and_then(BValue::as_list) else {
        return Vec::new();
    };

    tiers
        .iter()
        .filter_map(BValue::as_list)
        .map(|tier| {
            tier.iter()
                .filter_map(BValue::as_bytes)
                .map(|url| String::from_utf8_lossy(url).into_owned())
                .collect::<Vec<_>>()
        })
        .filter(|tier| !tier.is_empty())
        .collect()
}

fn get_length(dict: &Dict) -> Result<u64, TorrentError> {
    let length = get_integer(dict, "length")?;
    u64::try_from(length).map_err(|_| TorrentError::InvalidFieldType("length"))
}

/// Looks up a key in the dictionary and returns a byte slice if the value is a ByteString.
fn lookup_bytestring<'a>(dict: &'a Dict, key: &'static str) -> Result<&'a [u8], TorrentError> {
    let val = dict
        .get(key.as_bytes())
        .ok_or(TorrentError::MissingRequiredField(key))?;

    val.as_bytes().ok_or(TorrentError::InvalidFieldType(key))
}

/// Gets a ByteString from the dictionary as text, replacing invalid UTF-8.
fn get_string(dict: &Dict, key: &'static str) -> Result<String, TorrentError> {
    let bytes = lookup_bytestring(dict, key)?;
    Ok(String::from_utf8_lossy(bytes).into_owned())
}

/// Retrieves an integer value from the dictionary.
fn get_integer(dict: &Dict, key: &'static str) -> Result<i64, TorrentError> {
    let val = dict
        .get(key.as_bytes())
        .ok_or(TorrentError::MissingRequiredField(key))?;

    val.as_integer().ok_or(TorrentError::InvalidFieldType(key))
}

/// Optional text field: absent when missing or not a byte string.
fn optional_string(dict: &Dict, key: &str) -> Option<String> {
    dict.get(key.as_bytes())
        .and_then(BValue::as_bytes)
        .map(|b| String::from_utf8_lossy(b).into_owned())
}
