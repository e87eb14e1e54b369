#![allow(dead_code)]

pub mod mocks;

pub use mocks::{MockFile, full_disk_file};

use std::{
    collections::HashMap,
    fs::File,
    io::{Cursor, Read},
    path::Path,
};

use quick_xml::{
    events::{BytesStart, Event},
    reader::Reader,
};
use zip::ZipArchive;

/// Names of the entries of a ZIP file, in archive order.
pub fn zip_entry_names(zip_path: &Path) -> Vec<String> {
    let file = File::open(zip_path).unwrap();
    let archive = ZipArchive::new(file).unwrap();
    archive.file_names().map(str::to_string).collect()
}

/// Content of one entry of a ZIP held in memory.
pub fn zip_entry(bytes: &[u8], name: &str) -> Vec<u8> {
    let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
    let mut content = Vec::new();
    archive
        .by_name(name)
        .unwrap()
        .read_to_end(&mut content)
        .unwrap();
    content
}

struct SheetCell {
    text: bool,
    value: String,
}

/// The first worksheet of an XLSX workbook, with shared strings resolved.
pub struct Sheet {
    cells: HashMap<String, SheetCell>,
    strings: Vec<String>,
}

impl Sheet {
    pub fn from_bytes(bytes: &[u8]) -> Sheet {
        let cells = read_cells(&zip_entry(bytes, "xl/worksheets/sheet1.xml"));

        // Workbooks without text cells have no shared strings part.
        let archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
        let strings = if archive.index_for_name("xl/sharedStrings.xml").is_some() {
            read_shared_strings(&zip_entry(bytes, "xl/sharedStrings.xml"))
        } else {
            Vec::new()
        };

        Sheet { cells, strings }
    }

    pub fn from_path(path: &Path) -> Sheet {
        Sheet::from_bytes(&std::fs::read(path).unwrap())
    }

    /// Name of the first worksheet as declared in the workbook.
    pub fn workbook_sheet_name(bytes: &[u8]) -> String {
        read_events(&zip_entry(bytes, "xl/workbook.xml"))
            .iter()
            .find_map(|event| match event {
                Event::Empty(element) | Event::Start(element)
                    if element.name().as_ref() == b"sheet" =>
                {
                    attribute(element, b"name")
                }
                _ => None,
            })
            .unwrap()
    }

    /// Whether a cell holds a string rather than a number.
    pub fn is_text(&self, reference: &str) -> bool {
        self.cells.get(reference).is_some_and(|cell| cell.text)
    }

    /// Value of a cell such as `"B2"`, `None` when the cell is absent.
    pub fn cell(&self, reference: &str) -> Option<String> {
        let cell = self.cells.get(reference)?;

        if cell.text {
            self.strings.get(cell.value.parse::<usize>().ok()?).cloned()
        } else {
            Some(cell.value.clone())
        }
    }
}

fn read_events(xml: &[u8]) -> Vec<Event<'static>> {
    let mut reader = Reader::from_reader(xml);
    let mut buffer = Vec::new();
    let mut events = Vec::new();

    loop {
        match reader.read_event_into(&mut buffer).unwrap() {
            Event::Eof => break,
            event => events.push(event.into_owned()),
        }
        buffer.clear();
    }
    events
}

fn attribute(element: &BytesStart, key: &[u8]) -> Option<String> {
    element
        .attributes()
        .flatten()
        .find(|attr| attr.key.as_ref() == key)
        .map(|attr| std::str::from_utf8(attr.value.as_ref()).unwrap().to_string())
}

/// Cells holding a `<v>` value, by reference.
fn read_cells(xml: &[u8]) -> HashMap<String, SheetCell> {
    let mut cells = HashMap::new();
    let mut current: Option<(String, SheetCell)> = None;
    let mut in_value = false;

    for event in read_events(xml) {
        match &event {
            Event::Start(element) => match element.name().as_ref() {
                b"c" => {
                    let reference = attribute(element, b"r").unwrap();
                    let text = matches!(
                        attribute(element, b"t").as_deref(),
                        Some("s" | "str" | "inlineStr")
                    );
                    current = Some((
                        reference,
                        SheetCell {
                            text,
                            value: String::new(),
                        },
                    ));
                }
                b"v" => in_value = true,
                _ => {}
            },
            Event::End(element) => match element.name().as_ref() {
                b"c" => {
                    if let Some((reference, cell)) = current.take() {
                        cells.insert(reference, cell);
                    }
                }
                b"v" => in_value = false,
                _ => {}
            },
            Event::Text(text) if in_value => {
                if let Some((_, cell)) = current.as_mut() {
                    cell.value.push_str(std::str::from_utf8(text.as_ref()).unwrap());
                }
            }
            _ => {}
        }
    }
    cells
}

/// Shared strings in index order; rich text runs are concatenated.
fn read_shared_strings(xml: &[u8]) -> Vec<String> {
    let mut strings = Vec::new();
    let mut current: Option<String> = None;
    let mut in_text = false;

    for event in read_events(xml) {
        match &event {
            Event::Start(element) => match element.name().as_ref() {
                b"si" => current = Some(String::new()),
                b"t" => in_text = true,
                _ => {}
            },
            Event::Empty(element) if element.name().as_ref() == b"si" => {
                strings.push(String::new());
            }
            Event::End(element) => match element.name().as_ref() {
                b"si" => strings.extend(current.take()),
                b"t" => in_text = false,
                _ => {}
            },
            Event::Text(text) if in_text => {
                if let Some(value) = current.as_mut() {
                    value.push_str(std::str::from_utf8(text.as_ref()).unwrap());
                }
            }
            _ => {}
        }
    }
    strings
}
