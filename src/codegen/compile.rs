use std::collections::HashMap;

use wasm_encoder::{
    BlockType, CodeSection, EntityType, ExportKind, ExportSection, Function, FunctionSection,
    ImportSection, Instruction, Module, TypeSection, ValType,
};

use crate::{
    error::{ErrorKind, PResult},
    syntax::{Expression, FunctionDef, Prototype},
};

type FunctionIndex = u32;
type LocalIndex = u32;
type TypeIndex = u32;

const PRINT_MODULE: &str = "env";
const PRINT_FIELD: &str = "print";
const PRINT_FN: FunctionIndex = 0;

#[derive(Debug, Clone, Copy)]
struct FnSig {
    index: FunctionIndex,
    arity: usize,
}

/// Lowers parsed definitions into a single WebAssembly module. Every VSL
/// value is an `f64`.
pub(crate) struct Compiler {
    types: TypeSection,
    type_indices: HashMap<usize, TypeIndex>,
    signatures: HashMap<String, FnSig>,
}

impl Compiler {
    pub fn new() -> Self {
        Self {
            types: TypeSection::new(),
            type_indices: HashMap::new(),
            signatures: HashMap::new(),
        }
    }

    pub fn compile(mut self, defs: &[FunctionDef]) -> PResult<Vec<u8>> {
        let mut module = Module::new();
        let mut imports = ImportSection::new();
        let mut functions = FunctionSection::new();
        let mut exports = ExportSection::new();
        let mut code = CodeSection::new();

        self.types.function([ValType::F64], Vec::<ValType>::new());
        imports.import(PRINT_MODULE, PRINT_FIELD, EntityType::Function(0));

        let names = self.declare_fns(defs)?;

        for (def, name) in defs.iter().zip(&names) {
            let sig = self.signatures[name];
            let type_index = self.fn_type(sig.arity);

            functions.function(type_index);
            exports.export(name, ExportKind::Func, sig.index);

            log::debug!("Compiling `{name}` as function {}", sig.index);
            let f = FnCompiler::new(&self.signatures, &def.proto).compile(&def.body)?;
            code.function(&f);
        }

        module.section(&self.types);
        module.section(&imports);
        module.section(&functions);
        module.section(&exports);
        module.section(&code);

        Ok(module.finish())
    }

    /// Assigns every definition its function index before any body is
    /// compiled, so calls may refer to later definitions.
    fn declare_fns(&mut self, defs: &[FunctionDef]) -> PResult<Vec<String>> {
        let mut names = Vec::with_capacity(defs.len());
        let mut anon_count = 0;

        for (i, def) in defs.iter().enumerate() {
            let name = if def.proto.is_anonymous() {
                let name = format!("{}{anon_count}", def.proto.name);
                anon_count += 1;
                name
            } else {
                def.proto.name.clone()
            };

            if self.signatures.contains_key(&name) {
                return Err(ErrorKind::CodegenError(format!(
                    "Function `{name}` is already defined"
                )));
            }

            let sig = FnSig {
                index: i as FunctionIndex + 1,
                arity: def.proto.params.len(),
            };
            self.signatures.insert(name.clone(), sig);
            names.push(name);
        }

        Ok(names)
    }

    fn fn_type(&mut self, arity: usize) -> TypeIndex {
        if let Some(index) = self.type_indices.get(&arity) {
            return *index;
        }

        let index = self.types.len();
        self.types.function(vec![ValType::F64; arity], [ValType::F64]);
        self.type_indices.insert(arity, index);
        index
    }
}

struct FnCompiler<'c, 'src> {
    signatures: &'c HashMap<String, FnSig>,
    scope: HashMap<&'src str, LocalIndex>,
    params: u32,
    locals: u32,
    scratch: Option<LocalIndex>,
    instructions: Vec<Instruction<'static>>,
}

impl<'c, 'src> FnCompiler<'c, 'src> {
    fn new(signatures: &'c HashMap<String, FnSig>, proto: &Prototype<'src>) -> Self {
        let scope = proto
            .params
            .iter()
            .enumerate()
            .map(|(i, p)| (*p, i as LocalIndex))
            .collect();

        Self {
            signatures,
            scope,
            params: proto.params.len() as u32,
            locals: 0,
            scratch: None,
            instructions: vec![],
        }
    }

    fn compile(mut self, body: &Expression<'src>) -> PResult<Function> {
        self.compile_expr(body)?;
        self.instructions.push(Instruction::End);

        let mut f = Function::new([(self.locals, ValType::F64)]);
        self.instructions.iter().for_each(|ins| {
            f.instruction(ins);
        });

        Ok(f)
    }

    fn new_local(&mut self) -> LocalIndex {
        let index = self.params + self.locals;
        self.locals += 1;
        index
    }

    fn scratch(&mut self) -> LocalIndex {
        match self.scratch {
            Some(index) => index,
            None => {
                let index = self.new_local();
                self.scratch = Some(index);
                index
            }
        }
    }

    fn push(&mut self, ins: Instruction<'static>) {
        self.instructions.push(ins);
    }

    fn compile_expr(&mut self, expr: &Expression<'src>) -> PResult<()> {
        match expr {
            Expression::Number(v) => self.push(Instruction::F64Const(*v)),
            Expression::VarRef(id) => {
                let index = self.lookup_var(id)?;
                self.push(Instruction::LocalGet(index));
            }
            Expression::Unary { op, operand } => {
                let name = Prototype::unary_name(*op);
                let sig = self.lookup_fn(&name, 1).map_err(|_| {
                    ErrorKind::CodegenError(format!("Unknown unary operator `{op}`"))
                })?;
                self.compile_expr(operand)?;
                self.push(Instruction::Call(sig.index));
            }
            Expression::Binary { lhs, op: '=', rhs } => {
                let id = match lhs.as_ref() {
                    Expression::VarRef(id) => *id,
                    other => {
                        return Err(ErrorKind::CodegenError(format!(
                            "Destination of `=` must be a variable, found {other:?}"
                        )))
                    }
                };
                let index = self.lookup_var(id)?;
                self.compile_expr(rhs)?;
                self.push(Instruction::LocalTee(index));
            }
            Expression::Binary { lhs, op, rhs } => self.compile_binary(lhs, *op, rhs)?,
            Expression::Call { callee, args } => {
                let sig = self.lookup_fn(callee, args.len())?;
                for arg in args {
                    self.compile_expr(arg)?;
                }
                self.push(Instruction::Call(sig.index));
            }
            Expression::VarDecl { id, init } => {
                match init {
                    Some(init) => self.compile_expr(init)?,
                    None => self.push(Instruction::F64Const(0.0)),
                }
                let index = self.new_local();
                log::debug!("{id} => local {index}");
                self.scope.insert(*id, index);
                self.push(Instruction::LocalTee(index));
            }
            Expression::If {
                condition,
                then_branch,
                else_branch,
            } => {
                self.compile_condition(condition)?;
                self.push(Instruction::If(BlockType::Result(ValType::F64)));
                self.compile_expr(then_branch)?;
                self.push(Instruction::Else);
                match else_branch {
                    Some(else_branch) => self.compile_expr(else_branch)?,
                    None => self.push(Instruction::F64Const(0.0)),
                }
                self.push(Instruction::End);
            }
            Expression::While { condition, body } => {
                self.push(Instruction::Block(BlockType::Empty));
                self.push(Instruction::Loop(BlockType::Empty));
                self.compile_condition(condition)?;
                self.push(Instruction::I32Eqz);
                self.push(Instruction::BrIf(1));
                self.compile_expr(body)?;
                self.push(Instruction::Drop);
                self.push(Instruction::Br(0));
                self.push(Instruction::End);
                self.push(Instruction::End);
                self.push(Instruction::F64Const(0.0));
            }
            Expression::Return(value) => {
                self.compile_expr(value)?;
                self.push(Instruction::Return);
            }
            Expression::Print(value) => {
                self.compile_expr(value)?;
                let scratch = self.scratch();
                self.push(Instruction::LocalTee(scratch));
                self.push(Instruction::Call(PRINT_FN));
                self.push(Instruction::LocalGet(scratch));
            }
        }

        Ok(())
    }

    fn compile_binary(
        &mut self,
        lhs: &Expression<'src>,
        op: char,
        rhs: &Expression<'src>,
    ) -> PResult<()> {
        let ins = match op {
            '+' => Some(Instruction::F64Add),
            '-' => Some(Instruction::F64Sub),
            '*' => Some(Instruction::F64Mul),
            '<' => Some(Instruction::F64Lt),
            _ => None,
        };

        match ins {
            Some(ins) => {
                self.compile_expr(lhs)?;
                self.compile_expr(rhs)?;
                self.push(ins);
                if op == '<' {
                    self.push(Instruction::F64ConvertI32U);
                }
            }
            None => {
                let name = Prototype::binary_name(op);
                let sig = self.lookup_fn(&name, 2).map_err(|_| {
                    ErrorKind::CodegenError(format!("Unknown binary operator `{op}`"))
                })?;
                self.compile_expr(lhs)?;
                self.compile_expr(rhs)?;
                self.push(Instruction::Call(sig.index));
            }
        }

        Ok(())
    }

    /// Leaves an `i32` that is non-zero when the condition is not `0.0`.
    fn compile_condition(&mut self, condition: &Expression<'src>) -> PResult<()> {
        self.compile_expr(condition)?;
        self.push(Instruction::F64Const(0.0));
        self.push(Instruction::F64Ne);
        Ok(())
    }

    fn lookup_var(&self, id: &str) -> PResult<LocalIndex> {
        match self.scope.get(id) {
            Some(index) => Ok(*index),
            None => Err(ErrorKind::CodegenError(format!("Unknown variable `{id}`"))),
        }
    }

    fn lookup_fn(&self, name: &str, arity: usize) -> PResult<FnSig> {
        match self.signatures.get(name) {
            None => Err(ErrorKind::CodegenError(format!(
                "Unknown function `{name}`"
            ))),
            Some(sig) if sig.arity != arity => Err(ErrorKind::CodegenError(format!(
                "Incorrect number of arguments passed to `{name}`: expected {}, found {arity}",
                sig.arity
            ))),
            Some(sig) => Ok(*sig),
        }
    }
}

#[cfg(test)]
mod test {
    use super::Compiler;
    use crate::{
        driver::{Driver, TopLevel},
        error::{ErrorKind, PResult},
        syntax::FunctionDef,
    };

    fn parse_all(src: &str) -> Vec<FunctionDef> {
        Driver::new(src)
            .map(|item| match item {
                TopLevel::Definition(def) | TopLevel::Expression(def) => def,
                TopLevel::Error(why) => panic!("{why}"),
            })
            .collect()
    }

    fn compile(src: &str) -> PResult<Vec<u8>> {
        Compiler::new().compile(&parse_all(src))
    }

    fn compile_wat(src: &str) -> String {
        let bytes = compile(src).unwrap();
        wasmprinter::print_bytes(bytes).unwrap()
    }

    #[test]
    fn simple() {
        let bytes = compile("FUNC add(a b) a + b").unwrap();

        assert_eq!(&bytes[..4], b"\0asm");
    }

    #[test]
    fn exports_named_and_anonymous_fns() {
        let wat = compile_wat("FUNC add(a b) a + b  add(1, 2)  3 * 4");

        assert!(wat.contains("(import \"env\" \"print\""), "{wat}");
        assert!(wat.contains("(export \"add\""), "{wat}");
        assert!(wat.contains("(export \"__anon_expr0\""), "{wat}");
        assert!(wat.contains("(export \"__anon_expr1\""), "{wat}");
        assert!(wat.contains("f64.add"), "{wat}");
        assert!(wat.contains("f64.mul"), "{wat}");
    }

    #[test]
    fn control_flow() {
        let wat = compile_wat(
            "FUNC count(n) (VAR i := 0) + WHILE i < n DO PRINT i = i + 1 DONE + IF n < 0 THEN RETURN 0 FI",
        );

        assert!(wat.contains("loop"), "{wat}");
        assert!(wat.contains("br_if 1"), "{wat}");
        assert!(wat.contains("local.tee"), "{wat}");
        assert!(wat.contains("return"), "{wat}");
        assert!(wat.contains("f64.lt"), "{wat}");
    }

    #[test]
    fn forward_calls_and_user_operators() {
        let wat = compile_wat("FUNC f(x) g(x) FUNC g(x) x FUNC BINARY| 5 (a b) a + b  f(1) | 2");

        assert!(wat.contains("(export \"binary|\""), "{wat}");
        assert!(wat.contains("call "), "{wat}");
    }

    #[test]
    fn unknown_variable() {
        assert_eq!(
            compile("FUNC f(a) b"),
            Err(ErrorKind::CodegenError("Unknown variable `b`".into()))
        );
    }

    #[test]
    fn unknown_function_and_arity() {
        assert_eq!(
            compile("g(1)"),
            Err(ErrorKind::CodegenError("Unknown function `g`".into()))
        );
        assert!(matches!(
            compile("FUNC f(a) a  f(1, 2)"),
            Err(ErrorKind::CodegenError(_))
        ));
    }

    #[test]
    fn duplicate_function() {
        assert_eq!(
            compile("FUNC f(a) a FUNC f(b) b"),
            Err(ErrorKind::CodegenError("Function `f` is already defined".into()))
        );
    }

    #[test]
    fn assignment_needs_variable() {
        assert!(matches!(
            compile("FUNC f(a) 1 = a"),
            Err(ErrorKind::CodegenError(_))
        ));
    }
}
