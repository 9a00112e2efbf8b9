use std::fmt;
use std::io::{BufRead, BufReader};

use flate2::bufread::MultiGzDecoder;
use serde::Deserializer as _;
use serde::de::{self, MapAccess, SeqAccess, Visitor};
use serde_json::Value;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use super::models::RawProvider;
use super::source::{DatasetReader, DatasetSource};
use crate::core::error::{CatalogError, Result};

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];
const UTF8_BOM: [u8; 3] = [0xef, 0xbb, 0xbf];
const CONSUMER_CLOSED: &str = "provider consumer closed";


#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RootShape {
    Array,
    Object,
}


#[derive(Debug)]
pub enum ProviderEntry {
    Provider(RawProvider),
    Malformed { position: String, error: CatalogError },
}


#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamSummary {
    pub shape: RootShape,
    pub entries: usize,
}


pub fn open_decoded(reader: DatasetReader) -> Result<Box<dyn BufRead + Send>> {
    let mut buffered = BufReader::new(reader);
    let is_gzip = buffered.fill_buf()?.starts_with(&GZIP_MAGIC);

    if is_gzip {
        debug!("Dataset is gzip-compressed");
        Ok(Box::new(BufReader::new(MultiGzDecoder::new(buffered))))
    } else {
        Ok(Box::new(buffered))
    }
}


/// Consumes leading whitespace (and a BOM) and reports the root container
/// without consuming its opening byte.
pub fn detect_root_shape<R: BufRead + ?Sized>(reader: &mut R) -> Result<RootShape> {
    if reader.fill_buf()?.starts_with(&UTF8_BOM) {
        reader.consume(UTF8_BOM.len());
    }

    loop {
        let buf = reader.fill_buf()?;
        if buf.is_empty() {
            return Err(CatalogError::stream("dataset is empty"));
        }

        match buf.iter().position(|b| !b.is_ascii_whitespace()) {
            Some(pos) => {
                let first = buf[pos];
                reader.consume(pos);
                return match first {
                    b'[' => Ok(RootShape::Array),
                    b'{' => Ok(RootShape::Object),
                    other => Err(CatalogError::stream(format!(
                        "dataset root must be an array or object, found {:?}",
                        other as char
                    ))),
                };
            }
            None => {
                let len = buf.len();
                reader.consume(len);
            }
        }
    }
}


struct ProviderSink {
    tx: mpsc::Sender<ProviderEntry>,
    entries: usize,
}

impl ProviderSink {
    fn deliver<E: de::Error>(&mut self, position: String, value: Value) -> std::result::Result<(), E> {
        let entry = match serde_json::from_value::<RawProvider>(value) {
            Ok(provider) => ProviderEntry::Provider(provider),
            Err(e) => ProviderEntry::Malformed {
                position,
                error: CatalogError::from(e),
            },
        };
        self.entries += 1;
        self.tx
            .blocking_send(entry)
            .map_err(|_| E::custom(CONSUMER_CLOSED))
    }
}

struct ProviderVisitor<'a> {
    sink: &'a mut ProviderSink,
}

impl<'de> Visitor<'de> for ProviderVisitor<'_> {
    type Value = ();

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("an array of providers or an object whose values are providers")
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> std::result::Result<(), A::Error> {
        let mut index = 0usize;
        while let Some(value) = seq.next_element::<Value>()? {
            self.sink.deliver::<A::Error>(format!("[{}]", index), value)?;
            index += 1;
        }
        Ok(())
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> std::result::Result<(), A::Error> {
        while let Some((key, value)) = map.next_entry::<String, Value>()? {
            self.sink.deliver::<A::Error>(key, value)?;
        }
        Ok(())
    }
}


/// Blocking parse of one document. Each provider is materialised alone and
/// handed to `tx` before the next one is read.
pub fn parse_providers(reader: DatasetReader, tx: mpsc::Sender<ProviderEntry>) -> Result<StreamSummary> {
    let mut reader = open_decoded(reader)?;
    let shape = detect_root_shape(&mut reader)?;
    debug!("Dataset root shape: {:?}", shape);

    let mut sink = ProviderSink { tx, entries: 0 };
    let mut de = serde_json::Deserializer::from_reader(reader);
    let visitor = ProviderVisitor { sink: &mut sink };

    let parsed = match shape {
        RootShape::Array => (&mut de).deserialize_seq(visitor),
        RootShape::Object => (&mut de).deserialize_map(visitor),
    };
    parsed.and_then(|_| de.end()).map_err(|e| CatalogError::stream(e.to_string()))?;

    Ok(StreamSummary {
        shape,
        entries: sink.entries,
    })
}


pub struct ProviderStream {
    rx: mpsc::Receiver<ProviderEntry>,
    worker: JoinHandle<Result<StreamSummary>>,
}

impl ProviderStream {

    pub async fn open(source: &dyn DatasetSource, buffer: usize) -> Result<Self> {
        info!("Streaming providers from {}", source.describe());
        let reader = source.open().await?;
        let (tx, rx) = mpsc::channel(buffer.max(1));
        let worker = tokio::task::spawn_blocking(move || parse_providers(reader, tx));
        Ok(Self { rx, worker })
    }


    pub async fn next(&mut self) -> Option<ProviderEntry> {
        self.rx.recv().await
    }


    pub async fn finish(mut self) -> Result<StreamSummary> {
        self.rx.close();
        self.worker
            .await
            .map_err(|e| CatalogError::stream(format!("parser task failed: {}", e)))?
    }
}
