use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;

/// Read the entire file into a `String`, failing instead of truncating when
/// it is larger than `max_bytes`.
pub fn read_to_string_with_limit(path: &Path, max_bytes: usize) -> io::Result<String> {
    let file = File::open(path)?;
    let mut reader = BufReader::new(file).take(max_bytes as u64 + 1);
    let mut contents = String::new();
    reader.read_to_string(&mut contents)?;

    if contents.len() > max_bytes {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("file exceeds {max_bytes} bytes"),
        ));
    }

    Ok(contents)
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::io::ErrorKind;

    use tempfile::TempDir;

    use super::read_to_string_with_limit;

    #[test]
    fn reads_files_up_to_the_limit() {
        let temp = TempDir::new().expect("tempdir");
        let path = temp.path().join("list.txt");
        fs::write(&path, "10.0.0.0/8\n").expect("write");

        let contents = read_to_string_with_limit(&path, 11).expect("read");
        assert_eq!(contents, "10.0.0.0/8\n");
    }

    #[test]
    fn oversized_files_are_rejected() {
        let temp = TempDir::new().expect("tempdir");
        let path = temp.path().join("list.txt");
        fs::write(&path, "10.0.0.0/8\n").expect("write");

        let err = read_to_string_with_limit(&path, 4).expect_err("must fail");
        assert_eq!(err.kind(), ErrorKind::InvalidData);
    }

    #[test]
    fn missing_file_is_not_found() {
        let temp = TempDir::new().expect("tempdir");
        let err = read_to_string_with_limit(&temp.path().join("missing"), 16)
            .expect_err("must fail");
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }
}
