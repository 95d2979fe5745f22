use binrw::{BinRead, BinResult, BinWrite};
use byteorder::{ByteOrder, LittleEndian};
use std::io::Cursor;
use tokio::io::{AsyncRead, AsyncReadExt};

pub const WAV_HEADER_SIZE: usize = 44;
pub const WAVE_FORMAT_PCM: u16 = 0x0001;
pub const WAVE_FORMAT_EXTENSIBLE: u16 = 0xFFFE;

const PCM_FMT_CHUNK_SIZE: u32 = 16;
const RIFF_SIZE_BEFORE_DATA: u32 = 36;
const CHUNK_HEADER_SIZE: usize = 8;

/// Audio parameters of a probed stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WavParams {
    pub channels: u16,
    /// Bytes per sample of a single channel.
    pub sample_width: u16,
    pub sample_rate: u32,
    pub frames: u64,
}

impl WavParams {
    pub fn block_align(&self) -> u16 {
        self.channels * self.sample_width
    }

    pub fn data_bytes(&self, frames: u64) -> u64 {
        frames * self.block_align() as u64
    }

    pub fn with_frames(self, frames: u64) -> Self {
        Self { frames, ..self }
    }
}

/// The canonical 44 byte RIFF/WAVE header: one PCM `fmt ` chunk followed by `data`.
#[derive(Debug, Clone, PartialEq, Eq, BinRead, BinWrite)]
#[brw(little, magic = b"RIFF")]
pub struct WavHeader {
    pub riff_size: u32,

    #[brw(magic = b"WAVEfmt ")]
    pub fmt_size: u32,

    pub format_tag: u16,
    pub channels: u16,
    pub sample_rate: u32,
    pub byte_rate: u32,
    pub block_align: u16,
    pub bits_per_sample: u16,

    #[brw(magic = b"data")]
    pub data_size: u32,
}

impl WavHeader {
    /// Header announcing `frames` frames of `params`-shaped PCM.
    pub fn new(params: &WavParams, frames: u64) -> Self {
        let data_size = u32::try_from(params.data_bytes(frames)).unwrap_or(u32::MAX);

        Self {
            riff_size: data_size.saturating_add(RIFF_SIZE_BEFORE_DATA),
            fmt_size: PCM_FMT_CHUNK_SIZE,
            format_tag: WAVE_FORMAT_PCM,
            channels: params.channels,
            sample_rate: params.sample_rate,
            byte_rate: params.sample_rate * params.block_align() as u32,
            block_align: params.block_align(),
            bits_per_sample: params.sample_width * 8,
            data_size,
        }
    }

    pub fn to_bytes(&self) -> BinResult<Vec<u8>> {
        let mut cursor = Cursor::new(Vec::with_capacity(WAV_HEADER_SIZE));
        self.write(&mut cursor)?;
        Ok(cursor.into_inner())
    }
}

#[derive(Debug, BinRead)]
#[br(little, magic = b"RIFF")]
struct RiffPreamble {
    _riff_size: u32,
    form_type: [u8; 4],
}

#[derive(Debug, BinRead)]
#[br(little)]
struct FmtChunk {
    format_tag: u16,
    channels: u16,
    sample_rate: u32,
    _byte_rate: u32,
    block_align: u16,
    bits_per_sample: u16,
}

/// Why a stream could not be read as WAV, before any PCM was consumed.
#[derive(Debug)]
pub enum HeaderError {
    Io(std::io::Error),
    Malformed(String),
}

impl From<std::io::Error> for HeaderError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<binrw::Error> for HeaderError {
    fn from(err: binrw::Error) -> Self {
        Self::Malformed(err.to_string())
    }
}

/// Reads a RIFF/WAVE header from a forward-only stream, leaving it positioned at
/// the first PCM byte of the `data` chunk.
///
/// Chunks other than `fmt ` and `data` are skipped, since decoders and taggers
/// commonly put `LIST` or `fact` chunks in between.
pub async fn read_header<R: AsyncRead + Unpin>(reader: &mut R) -> Result<WavParams, HeaderError> {
    let mut preamble = [0u8; 12];
    reader.read_exact(&mut preamble).await?;
    let riff = RiffPreamble::read(&mut Cursor::new(&preamble))?;
    if &riff.form_type != b"WAVE" {
        return Err(HeaderError::Malformed("RIFF form type is not WAVE".to_string()));
    }

    let mut fmt: Option<FmtChunk> = None;
    loop {
        let mut raw = [0u8; CHUNK_HEADER_SIZE];
        reader.read_exact(&mut raw).await?;
        let size = LittleEndian::read_u32(&raw[4..8]);
        let padded = size as u64 + (size as u64 & 1);

        match &raw[0..4] {
            b"fmt " => {
                let mut body = vec![0u8; padded as usize];
                reader.read_exact(&mut body).await?;
                fmt = Some(FmtChunk::read(&mut Cursor::new(&body))?);
            }
            b"data" => {
                let fmt = fmt.ok_or_else(|| {
                    HeaderError::Malformed("data chunk before fmt chunk".to_string())
                })?;
                if fmt.format_tag != WAVE_FORMAT_PCM && fmt.format_tag != WAVE_FORMAT_EXTENSIBLE {
                    return Err(HeaderError::Malformed(format!(
                        "unknown format: {:#06x}",
                        fmt.format_tag
                    )));
                }
                if fmt.block_align == 0 || fmt.channels == 0 {
                    return Err(HeaderError::Malformed("empty sample frame".to_string()));
                }

                return Ok(WavParams {
                    channels: fmt.channels,
                    sample_width: fmt.bits_per_sample.div_ceil(8),
                    sample_rate: fmt.sample_rate,
                    frames: size as u64 / fmt.block_align as u64,
                });
            }
            _ => {
                tokio::io::copy(&mut (&mut *reader).take(padded), &mut tokio::io::sink()).await?;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cd_params() -> WavParams {
        WavParams {
            channels: 2,
            sample_width: 2,
            sample_rate: 44_100,
            frames: 0,
        }
    }

    #[test]
    fn one_second_of_cd_audio_has_expected_sizes() {
        let header = WavHeader::new(&cd_params(), 44_100);
        assert_eq!(header.data_size, 176_400);
        assert_eq!(header.riff_size, 176_436);
        assert_eq!(header.byte_rate, 176_400);
        assert_eq!(header.block_align, 4);
        assert_eq!(header.bits_per_sample, 16);
    }

    #[test]
    fn header_serializes_to_canonical_layout() {
        let bytes = WavHeader::new(&cd_params(), 44_100).to_bytes().unwrap();
        assert_eq!(bytes.len(), WAV_HEADER_SIZE);
        assert_eq!(&bytes[0..4], b"RIFF");
        assert_eq!(LittleEndian::read_u32(&bytes[4..8]), 176_436);
        assert_eq!(&bytes[8..16], b"WAVEfmt ");
        assert_eq!(LittleEndian::read_u32(&bytes[16..20]), 16);
        assert_eq!(LittleEndian::read_u16(&bytes[20..22]), WAVE_FORMAT_PCM);
        assert_eq!(LittleEndian::read_u16(&bytes[22..24]), 2);
        assert_eq!(LittleEndian::read_u32(&bytes[24..28]), 44_100);
        assert_eq!(&bytes[36..40], b"data");
        assert_eq!(LittleEndian::read_u32(&bytes[40..44]), 176_400);
    }

    #[tokio::test]
    async fn reads_back_a_generated_header() {
        let bytes = WavHeader::new(&cd_params(), 588).to_bytes().unwrap();
        let params = read_header(&mut bytes.as_slice()).await.unwrap();
        assert_eq!(params, cd_params().with_frames(588));
    }

    #[tokio::test]
    async fn skips_unknown_chunks() {
        let header = WavHeader::new(&cd_params(), 10).to_bytes().unwrap();
        let mut stream = Vec::new();
        stream.extend_from_slice(&header[..36]);
        stream.extend_from_slice(b"LIST");
        stream.extend_from_slice(&3u32.to_le_bytes());
        stream.extend_from_slice(&[1, 2, 3, 0]);
        stream.extend_from_slice(&header[36..]);
        stream.extend_from_slice(&[0xAB; 40]);

        let mut reader = stream.as_slice();
        let params = read_header(&mut reader).await.unwrap();
        assert_eq!(params.frames, 10);
        assert_eq!(reader, &[0xAB; 40][..]);
    }

    #[tokio::test]
    async fn rejects_non_wave_streams() {
        let mut reader: &[u8] = b"fLaC\0\0\0\x22 not a riff stream at all";
        assert!(matches!(
            read_header(&mut reader).await,
            Err(HeaderError::Malformed(_))
        ));
    }

    #[tokio::test]
    async fn empty_stream_is_an_io_error() {
        let mut reader: &[u8] = b"";
        assert!(matches!(
            read_header(&mut reader).await,
            Err(HeaderError::Io(_))
        ));
    }
}
