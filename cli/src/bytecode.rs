//! The stable `.skpb` bytecode file format: magic `SKPB`, three version
//! bytes, the top-level chunk's code, then its constants tagged by type.
//! The format carries int, float and string constants only; chunks whose
//! pool holds function prototypes cannot be serialized.

use compiler::chunk::{Chunk, Constant, FuncProto};
use std::{fs, path::Path};

const MAGIC: &[u8; 4] = b"SKPB";
const VERSION: [u8; 3] = [1, 0, 0];

const TAG_INT: u8 = 0;
const TAG_FLOAT: u8 = 1;
const TAG_STRING: u8 = 3;

pub fn save(chunk: &Chunk, path: &Path) -> Result<(), String> {
    let mut buffer = vec![];
    buffer.extend_from_slice(MAGIC);
    buffer.extend_from_slice(&VERSION);

    buffer.extend_from_slice(&(chunk.len() as u64).to_le_bytes());
    buffer.extend_from_slice(chunk.code());

    buffer.extend_from_slice(&(chunk.constants().len() as u64).to_le_bytes());
    for constant in chunk.constants() {
        match constant {
            Constant::Int(n) => {
                buffer.push(TAG_INT);
                buffer.extend_from_slice(&n.to_le_bytes());
            }
            Constant::Float(n) => {
                buffer.push(TAG_FLOAT);
                buffer.extend_from_slice(&n.to_le_bytes());
            }
            Constant::Str(string) => {
                buffer.push(TAG_STRING);
                buffer.extend_from_slice(&(string.len() as u64).to_le_bytes());
                buffer.extend_from_slice(string.as_bytes());
            }
            Constant::Func(_) => {
                return Err(
                    "لا يمكن حفظ كتلة تحتوي على دوال في ملف بايتكود".to_string()
                )
            }
        }
    }

    fs::write(path, buffer).map_err(|err| format!("خطأ في كتابة الملف: {err}"))
}

struct Reader<'a> {
    bytes: &'a [u8],
    at: usize,
}

impl<'a> Reader<'a> {
    fn take(&mut self, count: usize) -> Result<&'a [u8], String> {
        if self.at + count > self.bytes.len() {
            return Err("ملف بايتكود ناقص".to_string());
        }
        let slice = &self.bytes[self.at..self.at + count];
        self.at += count;
        Ok(slice)
    }

    fn take_u64(&mut self) -> Result<u64, String> {
        Ok(u64::from_le_bytes(self.take(8)?.try_into().unwrap()))
    }
}

pub fn load(path: &Path) -> Result<FuncProto, String> {
    let bytes = fs::read(path).map_err(|err| format!("خطأ في قراءة الملف: {err}"))?;
    let mut reader = Reader { bytes: &bytes, at: 0 };

    if reader.take(4)? != MAGIC {
        return Err("ليس ملف بايتكود سيكب".to_string());
    }
    let version = reader.take(3)?;
    if version != VERSION {
        return Err(format!(
            "نسخة بايتكود غير مدعومة: {}.{}.{}",
            version[0], version[1], version[2]
        ));
    }

    let code_len = reader.take_u64()? as usize;
    let code = reader.take(code_len)?.to_vec();

    let constant_count = reader.take_u64()? as usize;
    let mut constants = vec![];
    for _ in 0..constant_count {
        let tag = reader.take(1)?[0];
        let constant = match tag {
            TAG_INT => Constant::Int(i64::from_le_bytes(reader.take(8)?.try_into().unwrap())),
            TAG_FLOAT => Constant::Float(f64::from_le_bytes(reader.take(8)?.try_into().unwrap())),
            TAG_STRING => {
                let len = reader.take_u64()? as usize;
                let bytes = reader.take(len)?;
                Constant::Str(
                    String::from_utf8(bytes.to_vec())
                        .map_err(|_| "نص غير صالح في ملف البايتكود".to_string())?,
                )
            }
            _ => return Err(format!("نوع ثابت غير معروف: {tag}")),
        };
        constants.push(constant);
    }

    let chunk = Chunk::from_parts(code, vec![], constants);
    Ok(FuncProto::new(None, 0, chunk, vec![]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use compiler::chunk::Instruction;

    #[test]
    fn round_trip() {
        let mut chunk = Chunk::new();
        chunk
            .write_const(Instruction::CONST_INT, Constant::Int(7), 1)
            .unwrap();
        chunk
            .write_const(Instruction::CONST_STRING, Constant::Str("س".to_string()), 1)
            .unwrap();
        chunk
            .write_const(Instruction::CONST_FLOAT, Constant::Float(3.5), 1)
            .unwrap();
        chunk.write_instr(Instruction::HALT, 1);

        let dir = std::env::temp_dir().join("seekep_round_trip.skpb");
        save(&chunk, &dir).unwrap();
        let loaded = load(&dir).unwrap();

        assert_eq!(loaded.chunk.code(), chunk.code());
        assert_eq!(loaded.chunk.constants().len(), 3);
        std::fs::remove_file(&dir).ok();
    }

    #[test]
    fn function_constants_are_rejected() {
        use compiler::chunk::FuncProto;
        use std::rc::Rc;

        let mut chunk = Chunk::new();
        let proto = FuncProto::new(None, 0, Chunk::new(), vec![]);
        chunk.add_constant(Constant::Func(Rc::new(proto))).unwrap();

        let path = std::env::temp_dir().join("seekep_reject.skpb");
        assert!(save(&chunk, &path).is_err());
    }
}
