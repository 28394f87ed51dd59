pub mod natives;
pub mod value;

use colored::Colorize;
use compiler::chunk::{Constant, FuncProto, Instruction};
use std::{
    cell::RefCell,
    cmp::Ordering,
    collections::HashMap,
    fmt,
    io::{self, Write},
    rc::Rc,
    time::Instant,
};
use value::{Class, Closure, Dict, Object, UpValue, Value};

pub const STACK_MAX: usize = 65536;
pub const FRAMES_MAX: usize = 64;

/// The constructor method looked up when a class is called.
const INIT_METHOD: &str = "init";

struct CallFrame {
    closure: Rc<Closure>,
    ip: usize,
    base: usize,
    /// Constructor frames return the receiver regardless of the popped value.
    is_init: bool,
}

#[derive(Debug, Clone)]
pub struct RuntimeError {
    msg: String,
    trace: Vec<(Option<String>, usize)>,
}

impl fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "{}{}", "خطأ تنفيذي: ".bright_red(), self.msg)?;
        for (name, line) in &self.trace {
            writeln!(
                f,
                "من {} [السطر: {line}]",
                name.as_deref().unwrap_or("دالة غير معروفة"),
            )?;
        }
        Ok(())
    }
}

pub struct Vm {
    stack: Vec<Value>,
    frames: Vec<CallFrame>,
    globals: HashMap<String, Value>,
    /// Open cells sorted by descending stack slot.
    open_upvalues: Vec<Rc<RefCell<UpValue>>>,
    out: Box<dyn Write>,
    created_at: Instant,
}

impl Vm {
    pub fn new() -> Self {
        Self::with_output(Box::new(io::stdout()))
    }

    pub fn with_output(out: Box<dyn Write>) -> Self {
        let mut vm = Self {
            stack: vec![],
            frames: vec![],
            globals: HashMap::new(),
            open_upvalues: vec![],
            out,
            created_at: Instant::now(),
        };
        for (name, native) in natives::NATIVES {
            vm.register_native(name, native);
        }
        vm
    }

    /// Binds `name` in the globals map. Must run before `run`.
    pub fn register_native(&mut self, name: &str, native: value::Native) {
        self.globals
            .insert(name.to_string(), Value::new_native(native));
    }

    pub fn globals(&self) -> &HashMap<String, Value> {
        &self.globals
    }

    pub fn run(&mut self, proto: FuncProto) -> Result<(), RuntimeError> {
        let closure = Rc::new(Closure::new(Rc::new(proto), vec![]));
        self.stack
            .push(Value::Object(Object::Closure(Rc::clone(&closure))));
        self.frames.push(CallFrame {
            closure,
            ip: 0,
            base: 0,
            is_init: false,
        });

        let result = self.dispatch().map_err(|msg| self.build_error(msg));
        self.stack.clear();
        self.frames.clear();
        self.open_upvalues.clear();
        result
    }

    fn build_error(&self, msg: String) -> RuntimeError {
        let trace = self
            .frames
            .iter()
            .rev()
            .map(|frame| {
                let line = frame.closure.proto.chunk.line(frame.ip.saturating_sub(1));
                (frame.closure.name().clone(), line)
            })
            .collect();
        RuntimeError { msg, trace }
    }

    //>> Stack and stream helpers

    fn read_byte(&mut self) -> u8 {
        let frame = self.frames.last_mut().unwrap();
        let byte = frame.closure.proto.chunk.byte(frame.ip).unwrap();
        frame.ip += 1;
        byte
    }

    fn read_two_bytes(&mut self) -> u16 {
        let frame = self.frames.last_mut().unwrap();
        let two_bytes = frame.closure.proto.chunk.two_bytes(frame.ip);
        frame.ip += 2;
        two_bytes
    }

    fn constant(&self, idx: usize) -> Constant {
        self.frames
            .last()
            .unwrap()
            .closure
            .proto
            .chunk
            .constant(idx)
            .clone()
    }

    fn push(&mut self, value: Value) -> Result<(), String> {
        if self.stack.len() >= STACK_MAX {
            return Err("تجاوز الحد الأقصى لحجم المكدس".to_string());
        }
        self.stack.push(value);
        Ok(())
    }

    fn pop(&mut self) -> Value {
        self.stack.pop().unwrap()
    }

    fn peek(&self, distance: usize) -> &Value {
        &self.stack[self.stack.len() - 1 - distance]
    }

    //>> Native-function helpers

    pub fn check_arity(expected: usize, argc: usize) -> Result<(), String> {
        if expected == argc {
            Ok(())
        } else {
            Err(format!(
                "توقعت {expected} من المدخلات ولكن حصلت على {argc}"
            ))
        }
    }

    /// `idx` is zero-based within the `argc` arguments on top of the stack.
    pub fn arg(&self, argc: usize, idx: usize) -> &Value {
        &self.stack[self.stack.len() - argc + idx]
    }

    pub fn arg_number(&self, argc: usize, idx: usize) -> Result<f64, String> {
        match self.arg(argc, idx) {
            Value::Int(n) => Ok(*n as f64),
            Value::Float(n) => Ok(*n),
            _ => Err(format!("يجب أن يكون المدخل {idx} عدداً")),
        }
    }

    pub fn arg_int(&self, argc: usize, idx: usize) -> Result<i64, String> {
        match self.arg(argc, idx) {
            Value::Int(n) => Ok(*n),
            _ => Err(format!("يجب أن يكون المدخل {idx} عدداً صحيحاً")),
        }
    }

    pub fn arg_str(&self, argc: usize, idx: usize) -> Result<Rc<String>, String> {
        match self.arg(argc, idx) {
            Value::Object(Object::Str(string)) => Ok(Rc::clone(string)),
            _ => Err(format!("يجب أن يكون المدخل {idx} نصاً")),
        }
    }

    pub fn arg_list(&self, argc: usize, idx: usize) -> Result<Rc<RefCell<Vec<Value>>>, String> {
        match self.arg(argc, idx) {
            Value::Object(Object::List(items)) => Ok(Rc::clone(items)),
            _ => Err(format!("يجب أن يكون المدخل {idx} قائمة")),
        }
    }

    pub fn arg_dict(&self, argc: usize, idx: usize) -> Result<Rc<RefCell<Dict>>, String> {
        match self.arg(argc, idx) {
            Value::Object(Object::Dict(entries)) => Ok(Rc::clone(entries)),
            _ => Err(format!("يجب أن يكون المدخل {idx} قاموساً")),
        }
    }

    pub fn write_line(&mut self, text: &str) -> Result<(), String> {
        writeln!(self.out, "{text}").map_err(|err| format!("خطأ في الكتابة: {err}"))
    }

    pub fn elapsed_seconds(&self) -> f64 {
        self.created_at.elapsed().as_secs_f64()
    }

    //>> Upvalues

    /// Reuses the open cell for `slot` or inserts a new one, keeping the
    /// list sorted by descending slot.
    fn capture_upvalue(&mut self, slot: usize) -> Rc<RefCell<UpValue>> {
        let mut insert_at = self.open_upvalues.len();
        for (idx, cell) in self.open_upvalues.iter().enumerate() {
            let open_slot = cell.borrow().as_open();
            if open_slot == slot {
                return Rc::clone(cell);
            }
            if open_slot < slot {
                insert_at = idx;
                break;
            }
        }
        let cell = Rc::new(RefCell::new(UpValue::new(slot)));
        self.open_upvalues.insert(insert_at, Rc::clone(&cell));
        cell
    }

    /// Closes every open cell whose slot is at or above `min_slot`.
    fn close_upvalues(&mut self, min_slot: usize) {
        while let Some(cell) = self.open_upvalues.first() {
            let slot = cell.borrow().as_open();
            if slot < min_slot {
                break;
            }
            let value = self.stack[slot].clone();
            let cell = self.open_upvalues.remove(0);
            cell.borrow_mut().close(value);
        }
    }

    //>> Calls

    fn call_closure(
        &mut self,
        closure: Rc<Closure>,
        argc: usize,
        is_init: bool,
    ) -> Result<(), String> {
        if argc != closure.proto.arity as usize {
            return Err(format!(
                "توقعت {} من المدخلات ولكن حصلت على {argc}",
                closure.proto.arity
            ));
        }
        if self.frames.len() >= FRAMES_MAX {
            return Err("تجاوز الحد الأقصى لعمق الاستدعاء".to_string());
        }
        let base = self.stack.len() - argc - 1;
        self.frames.push(CallFrame {
            closure,
            ip: 0,
            base,
            is_init,
        });
        Ok(())
    }

    fn call_value(&mut self, argc: usize) -> Result<(), String> {
        let callee_idx = self.stack.len() - argc - 1;
        match self.stack[callee_idx].clone() {
            Value::Object(Object::Closure(closure)) => self.call_closure(closure, argc, false),
            Value::Object(Object::Native(native)) => {
                let result = native(self, argc)?;
                self.stack.truncate(callee_idx);
                self.push(result)
            }
            Value::Object(Object::Class(class)) => {
                let instance = Value::new_instance(Rc::clone(&class));
                self.stack[callee_idx] = instance;
                let init = class.borrow().methods.get(INIT_METHOD).cloned();
                match init {
                    Some(method) => self.call_closure(method, argc, true),
                    None if argc == 0 => Ok(()),
                    None => Err(format!(
                        "توقعت 0 من المدخلات ولكن حصلت على {argc}"
                    )),
                }
            }
            Value::Object(Object::BoundMethod(bound)) => {
                self.stack[callee_idx] = bound.receiver.clone();
                self.call_closure(Rc::clone(&bound.method), argc, false)
            }
            _ => Err("يمكن فقط استدعاء الدوال والأصناف".to_string()),
        }
    }

    /// Pops the topmost frame: closes its upvalues, truncates its window and
    /// pushes `result` in the caller. Returns `true` when the popped frame
    /// was the last one.
    fn pop_frame(&mut self, result: Value) -> Result<bool, String> {
        let frame = self.frames.pop().unwrap();
        self.close_upvalues(frame.base);
        let result = if frame.is_init {
            self.stack[frame.base].clone()
        } else {
            result
        };
        self.stack.truncate(frame.base);
        self.push(result)?;
        Ok(self.frames.is_empty())
    }

    //>> Dispatch

    fn dispatch(&mut self) -> Result<(), String> {
        use Instruction::*;

        loop {
            #[cfg(feature = "verbose")]
            {
                let frame = self.frames.last().unwrap();
                eprint!(
                    "{}",
                    frame.closure.proto.chunk.disassemble_instr_at(frame.ip).0
                );
            }

            let instr = Instruction::from(self.read_byte());
            match instr {
                CONST_INT | CONST_FLOAT | CONST_STRING => {
                    let idx = self.read_byte() as usize;
                    let value = match self.constant(idx) {
                        Constant::Int(n) => Value::Int(n),
                        Constant::Float(n) => Value::Float(n),
                        Constant::Str(string) => Value::new_string(string),
                        Constant::Func(_) => unreachable!(),
                    };
                    self.push(value)?;
                }
                CONST_TRUE => self.push(Value::Bool(true))?,
                CONST_FALSE => self.push(Value::Bool(false))?,
                CONST_NULL => self.push(Value::Null)?,
                CONST_LIST => {
                    let count = self.read_byte() as usize;
                    let items = self.stack.split_off(self.stack.len() - count);
                    self.push(Value::new_list(items))?;
                }
                CONST_DICT => {
                    let count = self.read_byte() as usize;
                    let flat = self.stack.split_off(self.stack.len() - count * 2);
                    let mut entries = Dict::new();
                    for pair in flat.chunks(2) {
                        let key = match pair[0].as_str() {
                            Some(key) => key.to_string(),
                            None => {
                                return Err("يجب أن يكون مفتاح القاموس نصاً".to_string())
                            }
                        };
                        entries.insert(key, pair[1].clone());
                    }
                    self.push(Value::new_dict(entries))?;
                }
                GET_LOCAL => {
                    let slot = self.read_byte() as usize;
                    let base = self.frames.last().unwrap().base;
                    self.push(self.stack[base + slot].clone())?;
                }
                SET_LOCAL => {
                    let slot = self.read_byte() as usize;
                    let base = self.frames.last().unwrap().base;
                    self.stack[base + slot] = self.peek(0).clone();
                }
                GET_GLOBAL => {
                    let idx = self.read_byte() as usize;
                    let name = match self.constant(idx) {
                        Constant::Str(name) => name,
                        _ => unreachable!(),
                    };
                    match self.globals.get(&name).cloned() {
                        Some(value) => self.push(value)?,
                        None => return Err(format!("متغير عام غير معروف: {name}")),
                    }
                }
                SET_GLOBAL => {
                    let idx = self.read_byte() as usize;
                    let name = match self.constant(idx) {
                        Constant::Str(name) => name,
                        _ => unreachable!(),
                    };
                    if !self.globals.contains_key(&name) {
                        return Err(format!("متغير عام غير معروف: {name}"));
                    }
                    self.globals.insert(name, self.peek(0).clone());
                }
                DEFINE_GLOBAL => {
                    let idx = self.read_byte() as usize;
                    let name = match self.constant(idx) {
                        Constant::Str(name) => name,
                        _ => unreachable!(),
                    };
                    let value = self.pop();
                    self.globals.insert(name, value);
                }
                GET_UPVALUE => {
                    let slot = self.read_byte() as usize;
                    let cell = Rc::clone(&self.frames.last().unwrap().closure.upvalues[slot]);
                    let value = match &*cell.borrow() {
                        UpValue::Open(slot) => self.stack[*slot].clone(),
                        UpValue::Closed(value) => value.clone(),
                    };
                    self.push(value)?;
                }
                SET_UPVALUE => {
                    let slot = self.read_byte() as usize;
                    let cell = Rc::clone(&self.frames.last().unwrap().closure.upvalues[slot]);
                    let value = self.peek(0).clone();
                    let open_slot = match &*cell.borrow() {
                        UpValue::Open(slot) => Some(*slot),
                        UpValue::Closed(_) => None,
                    };
                    match open_slot {
                        Some(slot) => self.stack[slot] = value,
                        None => *cell.borrow_mut() = UpValue::Closed(value),
                    }
                }
                GET_FIELD => {
                    let idx = self.read_byte() as usize;
                    let name = match self.constant(idx) {
                        Constant::Str(name) => name,
                        _ => unreachable!(),
                    };
                    let receiver = self.pop();
                    match &receiver {
                        Value::Object(Object::Instance(instance)) => {
                            let field = instance.borrow().fields.get(&name).cloned();
                            match field {
                                Some(value) => self.push(value)?,
                                None => {
                                    let method = instance
                                        .borrow()
                                        .class
                                        .borrow()
                                        .methods
                                        .get(&name)
                                        .cloned();
                                    match method {
                                        Some(method) => {
                                            let bound = Value::new_bound_method(
                                                receiver.clone(),
                                                method,
                                            );
                                            self.push(bound)?;
                                        }
                                        None => {
                                            return Err(format!(
                                                "لا يوجد حقل أو طريقة باسم: {name}"
                                            ))
                                        }
                                    }
                                }
                            }
                        }
                        _ => {
                            return Err(format!(
                                "لا يمكن قراءة الحقول من {}",
                                receiver.type_name()
                            ))
                        }
                    }
                }
                SET_FIELD => {
                    let idx = self.read_byte() as usize;
                    let name = match self.constant(idx) {
                        Constant::Str(name) => name,
                        _ => unreachable!(),
                    };
                    let value = self.pop();
                    let receiver = self.pop();
                    match &receiver {
                        Value::Object(Object::Instance(instance)) => {
                            instance.borrow_mut().fields.insert(name, value.clone());
                            self.push(value)?;
                        }
                        _ => {
                            return Err("يمكن تعيين الحقول فقط للكائنات".to_string())
                        }
                    }
                }
                GET_INDEX => {
                    let index = self.pop();
                    let object = self.pop();
                    let value = self.index_get(&object, &index)?;
                    self.push(value)?;
                }
                SET_INDEX => {
                    let value = self.pop();
                    let index = self.pop();
                    let object = self.pop();
                    self.index_set(&object, &index, value.clone())?;
                    self.push(value)?;
                }
                ADD => self.binary_op(Value::add)?,
                SUB => self.binary_op(Value::sub)?,
                MUL => self.binary_op(Value::mul)?,
                DIV => self.binary_op(Value::div)?,
                MOD => self.binary_op(Value::rem)?,
                POW => self.binary_op(Value::pow)?,
                NEG => {
                    let value = self.pop();
                    let value = value.neg()?;
                    self.push(value)?;
                }
                NOT => {
                    let value = self.pop();
                    self.push(Value::Bool(!value.is_truthy()))?;
                }
                AND => {
                    let b = self.pop();
                    let a = self.pop();
                    self.push(Value::Bool(a.is_truthy() && b.is_truthy()))?;
                }
                OR => {
                    let b = self.pop();
                    let a = self.pop();
                    self.push(Value::Bool(a.is_truthy() || b.is_truthy()))?;
                }
                EQ => {
                    let b = self.pop();
                    let a = self.pop();
                    self.push(Value::Bool(a == b))?;
                }
                NE => {
                    let b = self.pop();
                    let a = self.pop();
                    self.push(Value::Bool(a != b))?;
                }
                LT => self.comparison_op(&[Ordering::Less])?,
                GT => self.comparison_op(&[Ordering::Greater])?,
                LE => self.comparison_op(&[Ordering::Less, Ordering::Equal])?,
                GE => self.comparison_op(&[Ordering::Greater, Ordering::Equal])?,
                BIT_AND => self.bitwise_op(|a, b| a & b)?,
                BIT_OR => self.bitwise_op(|a, b| a | b)?,
                BIT_XOR => self.bitwise_op(|a, b| a ^ b)?,
                SHL => self.bitwise_op(|a, b| a.wrapping_shl(b as u32 & 63))?,
                SHR => self.bitwise_op(|a, b| a.wrapping_shr(b as u32 & 63))?,
                BIT_NOT => {
                    let value = self.pop();
                    match value.as_bits() {
                        Some(bits) => self.push(Value::Int(!bits))?,
                        None => {
                            return Err("يجب أن يكون المعامل عدداً صحيحاً".to_string())
                        }
                    }
                }
                JUMP => {
                    let offset = self.read_two_bytes() as usize;
                    self.frames.last_mut().unwrap().ip += offset;
                }
                JUMP_IF_FALSE => {
                    let offset = self.read_two_bytes() as usize;
                    if !self.peek(0).is_truthy() {
                        self.frames.last_mut().unwrap().ip += offset;
                    }
                }
                JUMP_IF_TRUE => {
                    let offset = self.read_two_bytes() as usize;
                    if self.peek(0).is_truthy() {
                        self.frames.last_mut().unwrap().ip += offset;
                    }
                }
                LOOP => {
                    let offset = self.read_two_bytes() as usize;
                    self.frames.last_mut().unwrap().ip -= offset;
                }
                CALL => {
                    let argc = self.read_byte() as usize;
                    self.call_value(argc)?;
                }
                RETURN => {
                    let result = self.pop();
                    if self.pop_frame(result)? {
                        return Ok(());
                    }
                }
                RETURN_VOID => {
                    if self.pop_frame(Value::Null)? {
                        return Ok(());
                    }
                }
                CLOSURE => {
                    let idx = self.read_byte() as usize;
                    let proto = match self.constant(idx) {
                        Constant::Func(proto) => proto,
                        _ => unreachable!(),
                    };
                    let upc = self.read_byte() as usize;
                    let base = self.frames.last().unwrap().base;
                    let mut upvalues = Vec::with_capacity(upc);
                    for _ in 0..upc {
                        let is_local = self.read_byte() != 0;
                        let index = self.read_byte() as usize;
                        if is_local {
                            upvalues.push(self.capture_upvalue(base + index));
                        } else {
                            upvalues.push(Rc::clone(
                                &self.frames.last().unwrap().closure.upvalues[index],
                            ));
                        }
                    }
                    self.push(Value::new_closure(Closure::new(proto, upvalues)))?;
                }
                CLOSE_UPVALUE => {
                    self.close_upvalues(self.stack.len() - 1);
                    self.pop();
                }
                CLASS => {
                    let idx = self.read_byte() as usize;
                    let name = match self.constant(idx) {
                        Constant::Str(name) => name,
                        _ => unreachable!(),
                    };
                    self.push(Value::new_class(Class::new(name)))?;
                }
                METHOD => {
                    let idx = self.read_byte() as usize;
                    let name = match self.constant(idx) {
                        Constant::Str(name) => name,
                        _ => unreachable!(),
                    };
                    let method = match self.pop() {
                        Value::Object(Object::Closure(closure)) => closure,
                        _ => unreachable!(),
                    };
                    match self.peek(0) {
                        Value::Object(Object::Class(class)) => {
                            class.borrow_mut().methods.insert(name, method);
                        }
                        _ => unreachable!(),
                    }
                }
                INHERIT => {
                    let child = self.pop();
                    let parent = self.pop();
                    match (&parent, &child) {
                        (
                            Value::Object(Object::Class(parent)),
                            Value::Object(Object::Class(child_class)),
                        ) => {
                            let parent_methods = parent.borrow().methods.clone();
                            child_class.borrow_mut().methods.extend(parent_methods);
                        }
                        _ => {
                            return Err("يمكن الوراثة من الأصناف فقط".to_string())
                        }
                    }
                    self.push(child)?;
                }
                ITER_NEXT => {
                    let index = match self.pop() {
                        Value::Int(n) => n as usize,
                        _ => unreachable!(),
                    };
                    let iterable = self.pop();
                    let item = match &iterable {
                        Value::Object(Object::List(items)) => {
                            items.borrow().get(index).cloned()
                        }
                        Value::Object(Object::Str(string)) => string
                            .chars()
                            .nth(index)
                            .map(|c| Value::new_string(c.to_string())),
                        Value::Object(Object::Dict(entries)) => entries
                            .borrow()
                            .get_index(index)
                            .map(|(key, _)| Value::new_string(key.clone())),
                        _ => {
                            return Err(format!(
                                "لا يمكن المرور على {}",
                                iterable.type_name()
                            ))
                        }
                    };
                    match item {
                        Some(value) => {
                            self.push(value)?;
                            self.push(Value::Bool(true))?;
                        }
                        None => {
                            self.push(Value::Null)?;
                            self.push(Value::Bool(false))?;
                        }
                    }
                }
                THROW | TRY_START | CATCH | FINALLY | UNKNOWN => {
                    return Err("تعليمة غير مدعومة".to_string())
                }
                POP => {
                    self.pop();
                }
                DUP => {
                    let value = self.peek(0).clone();
                    self.push(value)?;
                }
                SWAP => {
                    let len = self.stack.len();
                    self.stack.swap(len - 1, len - 2);
                }
                IMPORT | EXPORT => {
                    // reserved placeholders
                    self.read_byte();
                }
                HALT => return Ok(()),
            }

            #[cfg(feature = "verbose")]
            eprintln!("{:?}", self.stack);
        }
    }

    fn binary_op(
        &mut self,
        op: fn(Value, Value) -> Result<Value, String>,
    ) -> Result<(), String> {
        let b = self.pop();
        let a = self.pop();
        let result = op(a, b)?;
        self.push(result)
    }

    fn comparison_op(&mut self, accepted: &[Ordering]) -> Result<(), String> {
        let b = self.pop();
        let a = self.pop();
        match a.compare(&b) {
            Some(ordering) => self.push(Value::Bool(accepted.contains(&ordering))),
            None => Err("يجب أن يكون المعاملان رقمين أو نصين".to_string()),
        }
    }

    fn bitwise_op(&mut self, op: fn(i64, i64) -> i64) -> Result<(), String> {
        let b = self.pop();
        let a = self.pop();
        match (a.as_bits(), b.as_bits()) {
            (Some(a), Some(b)) => self.push(Value::Int(op(a, b))),
            _ => Err("يجب أن يكون المعاملان عددين صحيحين".to_string()),
        }
    }

    fn index_get(&self, object: &Value, index: &Value) -> Result<Value, String> {
        match object {
            Value::Object(Object::List(items)) => {
                let items = items.borrow();
                let idx = self.absolute_index(index, items.len())?;
                Ok(items[idx].clone())
            }
            Value::Object(Object::Str(string)) => {
                let count = string.chars().count();
                let idx = self.absolute_index(index, count)?;
                Ok(Value::new_string(
                    string.chars().nth(idx).unwrap().to_string(),
                ))
            }
            Value::Object(Object::Dict(entries)) => match index.as_str() {
                Some(key) => match entries.borrow().get(key) {
                    Some(value) => Ok(value.clone()),
                    None => Err(format!("المفتاح غير موجود: {key}")),
                },
                None => Err("يجب أن يكون مفتاح القاموس نصاً".to_string()),
            },
            _ => Err(format!(
                "لا يمكن الفهرسة في {}",
                object.type_name()
            )),
        }
    }

    fn index_set(&self, object: &Value, index: &Value, value: Value) -> Result<(), String> {
        match object {
            Value::Object(Object::List(items)) => {
                let len = items.borrow().len();
                let idx = self.absolute_index(index, len)?;
                items.borrow_mut()[idx] = value;
                Ok(())
            }
            Value::Object(Object::Dict(entries)) => match index.as_str() {
                Some(key) => {
                    entries.borrow_mut().insert(key.to_string(), value);
                    Ok(())
                }
                None => Err("يجب أن يكون مفتاح القاموس نصاً".to_string()),
            },
            _ => Err(format!(
                "لا يمكن الفهرسة في {}",
                object.type_name()
            )),
        }
    }

    /// Negative indices count from the end.
    fn absolute_index(&self, index: &Value, len: usize) -> Result<usize, String> {
        let idx = match index {
            Value::Int(n) => *n,
            _ => return Err("يجب أن يكون رقم العنصر عدداً صحيحاً".to_string()),
        };
        let absolute = if idx < 0 { idx + len as i64 } else { idx };
        if absolute < 0 || absolute >= len as i64 {
            return Err(format!("لا يوجد عنصر برقم: {idx}"));
        }
        Ok(absolute as usize)
    }
}

impl Default for Vm {
    fn default() -> Self {
        Self::new()
    }
}
