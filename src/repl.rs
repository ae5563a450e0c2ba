//! Interactive REPL threading compiler and VM state across lines.
//!
//! The symbol table, constant pool, and globals array persist for the whole
//! session; a fresh compiler and VM are constructed per line.

use std::cell::RefCell;
use std::io::Write;
use std::path::PathBuf;
use std::rc::Rc;

use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

use crate::compiler::{Compiler, SymbolTable};
use crate::error::ParserError;
use crate::lexer::Scanner;
use crate::object::builtins::BUILTINS;
use crate::object::Object;
use crate::parser::Parser;
use crate::vm::{Vm, GLOBALS_SIZE};

const PROMPT: &str = ">> ";
const HISTORY_FILE: &str = ".monkey_history";

const MONKEY_FACE: &str = r#"            __,__
   .--.  .-"     "-.  .--.
  / .. \/  .-. .-.  \/ .. \
 | |  '|  /   Y   \  |'  | |
 | \   \  \ 0 | 0 /  /   / |
  \ '- ,\.-"""""""-./, -' /
   ''-' /_   ^ ^   _\ '-''
       |  \._   _./  |
       \   \ '~' /   /
        '._ '-=-' _.'
           '-----'
"#;

pub struct Repl {
    constants: Rc<RefCell<Vec<Object>>>,
    globals: Rc<RefCell<Vec<Object>>>,
    symbol_table: Rc<RefCell<SymbolTable>>,
    history_file: PathBuf,
}

impl Repl {
    pub fn new() -> Self {
        let mut symbol_table = SymbolTable::new();
        for (index, builtin) in BUILTINS.iter().enumerate() {
            symbol_table.define_builtin(index, builtin.name);
        }

        Self {
            constants: Rc::new(RefCell::new(Vec::new())),
            globals: Rc::new(RefCell::new(vec![Object::Null; GLOBALS_SIZE])),
            symbol_table: Rc::new(RefCell::new(symbol_table)),
            history_file: Self::history_path(),
        }
    }

    fn history_path() -> PathBuf {
        if let Some(home) = dirs::home_dir() {
            home.join(HISTORY_FILE)
        } else {
            PathBuf::from(HISTORY_FILE)
        }
    }

    /// Run the read-compile-run-print loop until EOF.
    pub fn run(&mut self) {
        println!("Hello! This is the Monkey programming language!");
        println!("Feel free to type in commands");

        let mut editor = match DefaultEditor::new() {
            Ok(editor) => editor,
            Err(_) => {
                println!("Warning: using basic input (no history or line editing)");
                self.run_basic();
                return;
            }
        };
        let _ = editor.load_history(&self.history_file);

        loop {
            match editor.readline(PROMPT) {
                Ok(line) => {
                    let line = line.trim();
                    if line.is_empty() {
                        continue;
                    }
                    let _ = editor.add_history_entry(line);
                    self.execute_line(line);
                }
                Err(ReadlineError::Interrupted) => {
                    println!("^C");
                    continue;
                }
                Err(ReadlineError::Eof) => break,
                Err(err) => {
                    println!("Error: {}", err);
                    break;
                }
            }
        }

        let _ = editor.save_history(&self.history_file);
    }

    fn run_basic(&mut self) {
        let stdin = std::io::stdin();
        loop {
            print!("{}", PROMPT);
            let _ = std::io::stdout().flush();

            let mut line = String::new();
            match stdin.read_line(&mut line) {
                Ok(0) => break,
                Ok(_) => {
                    let line = line.trim();
                    if line.is_empty() {
                        continue;
                    }
                    self.execute_line(line);
                }
                Err(err) => {
                    println!("Error: {}", err);
                    break;
                }
            }
        }
    }

    fn execute_line(&mut self, line: &str) {
        let tokens = Scanner::new(line).scan_tokens();
        let program = match Parser::new(tokens).parse() {
            Ok(program) => program,
            Err(errors) => {
                print_parser_errors(&errors);
                return;
            }
        };

        let mut compiler =
            Compiler::new_with_state(Rc::clone(&self.symbol_table), Rc::clone(&self.constants));
        if let Err(err) = compiler.compile(&program) {
            println!("Whoops! Compilation failed:\n {}", err);
            return;
        }

        let mut machine = Vm::new_with_globals_store(compiler.bytecode(), Rc::clone(&self.globals));
        if let Err(err) = machine.run() {
            println!("Whoops! Executing bytecode failed:\n {}", err);
            return;
        }

        println!("{}", machine.last_popped_stack_elem());
    }
}

impl Default for Repl {
    fn default() -> Self {
        Self::new()
    }
}

fn print_parser_errors(errors: &[ParserError]) {
    print!("{}", MONKEY_FACE);
    println!("Whoops! We ran into some monkey business here!");
    println!(" parser errors:");
    for err in errors {
        println!("\t{}", err);
    }
}
