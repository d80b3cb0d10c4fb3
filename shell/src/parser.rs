use log::trace;

use crate::error::SyntaxError;
use crate::types::Token;

type ParseResult<T> = Result<T, SyntaxError>;

struct Parser<'a> {
	line: &'a [char],
	i: usize,
}

impl<'a> Parser<'a> {
	fn proceed_while<F>(&mut self, f: F) where F: Fn(char) -> bool {
		while let Some(&c) = self.line.get(self.i) {
			if !f(c) { break; }
			self.i += 1;
		}
	}

	fn is_whitespace(c: char) -> bool {
		matches!(c, ' ' | '\t' | '\n' | '\r')
	}

	fn is_operator(c: char) -> bool {
		matches!(c, '|' | '<' | '>')
	}

	fn is_plain(c: char) -> bool {
		!Parser::is_whitespace(c) && !Parser::is_operator(c) && !matches!(c, '\'' | '"' | '\\')
	}

	fn skip_whitespaces(&mut self) {
		self.proceed_while(Parser::is_whitespace);
	}

	fn read_single_quoted(&mut self, word: &mut String) -> ParseResult<()> {
		self.i += 1;
		let orig = self.i;
		self.proceed_while(|c| c != '\'');
		if self.i == self.line.len() {
			return Err(SyntaxError::UnterminatedQuote);
		}
		word.extend(&self.line[orig .. self.i]);
		self.i += 1;
		Ok(())
	}

	fn read_double_quoted(&mut self, word: &mut String) -> ParseResult<()> {
		self.i += 1;
		loop {
			match self.line.get(self.i) {
				None => { return Err(SyntaxError::UnterminatedQuote); },
				Some(&'"') => {
					self.i += 1;
					return Ok(());
				},
				Some(&'\\') if matches!(self.line.get(self.i + 1), Some(&'"') | Some(&'\\')) => {
					word.push(self.line[self.i + 1]);
					self.i += 2;
				},
				Some(&c) => {
					word.push(c);
					self.i += 1;
				},
			}
		}
	}

	fn read_word(&mut self) -> ParseResult<Token> {
		let mut word = String::new();
		while let Some(&c) = self.line.get(self.i) {
			match c {
				'\'' => self.read_single_quoted(&mut word)?,
				'"' => self.read_double_quoted(&mut word)?,
				'\\' => {
					self.i += 1;
					if let Some(&escaped) = self.line.get(self.i) {
						word.push(escaped);
						self.i += 1;
					}
				},
				_ if Parser::is_plain(c) => {
					let orig = self.i;
					self.proceed_while(Parser::is_plain);
					word.extend(&self.line[orig .. self.i]);
				},
				_ => { break; },
			}
		}
		Ok(word)
	}

	fn parse_tokens(&mut self) -> ParseResult<Vec<Token>> {
		let mut tokens: Vec<Token> = vec![];
		loop {
			self.skip_whitespaces();
			match self.line.get(self.i) {
				None => { break; },
				Some(&c) if Parser::is_operator(c) => {
					tokens.push(c.to_string());
					self.i += 1;
				},
				Some(_) => tokens.push(self.read_word()?),
			}
		}
		Ok(tokens)
	}
}

/// Splits one input line into tokens.
///
/// `|`, `<` and `>` always stand alone. Quotes are removed; quoted text and
/// adjacent unquoted text form a single token.
pub fn tokenize(line: &str) -> ParseResult<Vec<Token>> {
	let chars: Vec<char> = line.chars().collect();
	let mut parser = Parser { line: &chars, i: 0 };
	let tokens = parser.parse_tokens()?;
	trace!("tokenized {:?} into {:?}", line, tokens);
	Ok(tokens)
}
